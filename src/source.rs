//! Building a [`Document`] from XML text.
//!
//! The serializer never parses; this adapter exists so the command line and
//! the tests have something to feed it. Prefixes are resolved against the
//! declarations in scope, predefined and character references are expanded,
//! and adjacent character data is merged into a single text node.

use std::borrow::Cow;
use std::str;
use std::sync::OnceLock;

use log::debug;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::error::{SourceError, SourceResult};
use crate::namespace::{Namespace, NamespaceScope};
use crate::tree::{Attribute, DocType, Document, Element, Node, ProcessingInstruction};

/// Produces document trees from text.
pub trait DocumentSource {
    fn read_document(&self, text: &str) -> SourceResult<Document>;
}

/// [`DocumentSource`] backed by `quick-xml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReaderSource;

impl DocumentSource for XmlReaderSource {
    fn read_document(&self, text: &str) -> SourceResult<Document> {
        parse_str(text)
    }
}

static DOCTYPE_REGEX: OnceLock<Regex> = OnceLock::new();

fn doctype_regex() -> &'static Regex {
    DOCTYPE_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)^\s*([^\s\[>]+)(?:\s+(?:PUBLIC\s+(?:"([^"]*)"|'([^']*)')\s+(?:"([^"]*)"|'([^']*)')|SYSTEM\s+(?:"([^"]*)"|'([^']*)')))?\s*(?:\[(.*)\])?\s*$"#,
        )
        .expect("Failed to compile DOCTYPE regex")
    })
}

/// An element still waiting for its end tag.
struct Open {
    element: Element,
    mark: usize,
}

struct TreeBuilder {
    document: Document,
    open: Vec<Open>,
    scope: NamespaceScope,
}

/// Parses `text` into a [`Document`].
pub fn parse_str(text: &str) -> SourceResult<Document> {
    let mut reader = Reader::from_str(text);
    let mut builder = TreeBuilder {
        document: Document::new(),
        open: Vec::new(),
        scope: NamespaceScope::new(),
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => builder.start(&e)?,
            Event::Empty(e) => {
                builder.start(&e)?;
                builder.end();
            }
            Event::End(_) => builder.end(),
            Event::Text(e) => builder.text(&e.xml10_content()?),
            Event::GeneralRef(e) => {
                let name = str::from_utf8(e.as_ref())?;
                let resolved = resolve_entity(name)?;
                builder.text(&resolved);
            }
            Event::CData(e) => {
                let data = e.xml10_content()?;
                builder.append(Node::CData(data.into_owned()));
            }
            Event::Comment(e) => {
                let comment = e.xml10_content()?;
                builder.append(Node::Comment(comment.into_owned()));
            }
            Event::PI(e) => {
                let target = str::from_utf8(e.target())?;
                let data = str::from_utf8(e.content())?.trim_start();
                builder.append(Node::ProcessingInstruction(ProcessingInstruction::new(
                    target, data,
                )));
            }
            Event::DocType(e) => {
                let declaration = str::from_utf8(e.as_ref())?;
                builder.append(Node::DocType(parse_doctype(declaration)));
            }
            Event::Eof => break,
            // The declaration is rewritten from the output format.
            _ => {}
        }
    }

    if let Some(open) = builder.open.last() {
        return Err(SourceError::UnclosedElement {
            name: open.element.qualified_name(),
        });
    }
    if builder.document.root().is_none() {
        return Err(SourceError::NoRootElement);
    }
    Ok(builder.document)
}

impl TreeBuilder {
    fn start(&mut self, start: &BytesStart<'_>) -> SourceResult<()> {
        let mark = self.scope.mark();
        let qualified = str::from_utf8(start.name().as_ref())?.to_string();

        let mut declared = Vec::new();
        let mut plain = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = str::from_utf8(attr.key.as_ref())?.to_string();
            let raw = str::from_utf8(attr.value.as_ref())?;
            let value = unescape(&normalize_attribute_value(raw))?.into_owned();

            if key == "xmlns" {
                declared.push(Namespace::default_for(value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                declared.push(Namespace::new(prefix, value));
            } else {
                plain.push((key, value));
            }
        }
        for namespace in &declared {
            self.scope.push(namespace.clone());
        }

        let (prefix, local) = split_name(&qualified);
        let namespace = self.resolve(prefix, &qualified, true)?;
        let mut element = Element::new(local).with_namespace(namespace);
        for declaration in declared {
            if declaration != element.namespace && !declaration.is_none() {
                element.add_namespace_declaration(declaration);
            }
        }
        for (key, value) in plain {
            let (prefix, local) = split_name(&key);
            let namespace = self.resolve(prefix, &key, false)?;
            element.set_attribute(Attribute::new(local, value).with_namespace(namespace));
        }

        self.open.push(Open { element, mark });
        Ok(())
    }

    fn resolve(&self, prefix: &str, name: &str, is_element: bool) -> SourceResult<Namespace> {
        if prefix == "xml" {
            return Ok(Namespace::xml());
        }
        if prefix.is_empty() {
            // Unprefixed attributes never take the default namespace.
            return Ok(match self.scope.uri_for("") {
                Some(uri) if is_element && !uri.is_empty() => Namespace::default_for(uri),
                _ => Namespace::none(),
            });
        }
        match self.scope.uri_for(prefix) {
            Some(uri) if !uri.is_empty() => Ok(Namespace::new(prefix, uri)),
            _ => Err(SourceError::UnboundPrefix {
                prefix: prefix.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };
        self.scope.pop_to(open.mark);
        self.append(Node::Element(open.element));
    }

    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.element.children.push(node),
            None => self.document.push(node),
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let Some(parent) = self.open.last_mut() else {
            if text.chars().all(char::is_whitespace) {
                return;
            }
            debug!("Text outside the root element: {:?}", text);
            self.document.push(Node::text(text));
            return;
        };
        match parent.element.children.last_mut() {
            Some(Node::Text(existing)) => existing.push_str(text),
            _ => parent.element.children.push(Node::text(text)),
        }
    }
}

/// Line ends become `\n`, then literal tabs and newlines become spaces.
/// Character references are expanded afterwards and keep their character.
fn normalize_attribute_value(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\r', '\n', '\t']) {
        return Cow::Borrowed(raw);
    }
    Cow::Owned(raw.replace("\r\n", "\n").replace(['\r', '\n', '\t'], " "))
}

fn split_name(qualified: &str) -> (&str, &str) {
    match qualified.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", qualified),
    }
}

fn resolve_entity(name: &str) -> SourceResult<String> {
    let resolved = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                None
            }
        }
    };
    resolved
        .map(String::from)
        .ok_or_else(|| SourceError::UnknownEntity {
            name: name.to_string(),
        })
}

fn parse_doctype(declaration: &str) -> DocType {
    let Some(captures) = doctype_regex().captures(declaration) else {
        return DocType::new(declaration.trim());
    };
    let group = |indexes: &[usize]| {
        indexes
            .iter()
            .find_map(|&i| captures.get(i))
            .map(|m| m.as_str().to_string())
    };

    let mut doctype = DocType::new(group(&[1]).unwrap_or_default());
    doctype.public_id = group(&[2, 3]);
    doctype.system_id = group(&[4, 5, 6, 7]);
    doctype.internal_subset = group(&[8])
        .map(|subset| subset.trim_start_matches(['\r', '\n']).to_string())
        .filter(|subset| !subset.trim().is_empty());
    doctype
}
