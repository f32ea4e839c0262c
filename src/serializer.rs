//! XML serializer
//!
//! Walks a [`Document`] depth-first and writes it according to a [`Format`].
//! The format is read-only for the whole walk; the only mutable state is the
//! output sink and the namespace bindings of the current path, both owned by
//! a single call.
//!
//! Layout rules:
//!
//! - Outside `Preserve`, whitespace-only text nodes at the start or end of an
//!   element's content are skipped. An element whose content then starts
//!   with a block node (element, comment, processing instruction) gets each
//!   child on its own indented line; pure text content stays inline.
//! - In `Preserve` no line separators or indentation are synthesized inside
//!   elements. `xml:space="preserve"` switches a subtree to this mode and
//!   `xml:space="default"` switches it back to the configured one.
//! - With `indent_attributes`, every attribute goes on its own line, aligned
//!   one character left of the next indentation level so that the separating
//!   space lands on the indentation column.

use std::fmt::{self, Write};

use log::warn;

use crate::escape::EscapeStrategy;
use crate::format::{Format, Indent, TextMode};
use crate::namespace::{Namespace, NamespaceScope};
use crate::tree::{Attribute, DocType, Document, Element, Node, ProcessingInstruction};

/// Serializes `document` into a new string.
pub fn serialize(document: &Document, format: &Format) -> String {
    XmlSerializer::new(format).serialize(document)
}

/// Serializes `document` into `out`.
pub fn serialize_to<W: Write>(document: &Document, format: &Format, out: &mut W) -> fmt::Result {
    XmlSerializer::new(format).write_document(document, out)
}

/// A serializer bound to one [`Format`]; reusable and shareable across
/// threads.
#[derive(Debug, Clone)]
pub struct XmlSerializer<'f> {
    format: &'f Format,
    escape: EscapeStrategy,
}

impl<'f> XmlSerializer<'f> {
    pub fn new(format: &'f Format) -> Self {
        Self {
            format,
            escape: EscapeStrategy::for_encoding(&format.encoding),
        }
    }

    pub fn format(&self) -> &Format {
        self.format
    }

    pub fn serialize(&self, document: &Document) -> String {
        let mut out = String::new();
        // Writing into a String never fails.
        let _ = self.write_document(document, &mut out);
        out
    }

    pub fn write_document<W: Write>(&self, document: &Document, out: &mut W) -> fmt::Result {
        Walk::new(self, out).document(document)
    }

    /// Writes a lone element at level zero, without declaration.
    pub fn write_element<W: Write>(&self, element: &Element, out: &mut W) -> fmt::Result {
        let mut walk = Walk::new(self, out);
        let layout = Layout::configured(self.format);
        walk.element(element, 0, layout)
    }
}

/// Text handling in effect for the current subtree.
#[derive(Debug, Clone, Copy)]
struct Layout<'f> {
    text_mode: TextMode,
    indent: Option<&'f Indent>,
}

impl<'f> Layout<'f> {
    fn configured(format: &'f Format) -> Self {
        match format.text_mode {
            TextMode::Preserve => Self::preserve(),
            text_mode => Self {
                text_mode,
                indent: format.indent.as_ref(),
            },
        }
    }

    fn preserve() -> Self {
        Self {
            text_mode: TextMode::Preserve,
            indent: None,
        }
    }

    fn pads_adjacent_text(&self) -> bool {
        self.text_mode.skips_whitespace()
    }

    /// Whitespace-only text contributes nothing, not even padding.
    fn drops_whitespace_only(&self, text: &str) -> bool {
        self.text_mode == TextMode::TrimFullWhite && is_whitespace(text)
    }

    fn apply<'t>(&self, text: &'t str) -> std::borrow::Cow<'t, str> {
        match self.text_mode {
            TextMode::Preserve => text.into(),
            TextMode::Trim | TextMode::TrimFullWhite => trim(text).into(),
            TextMode::Normalize => normalize(text).into(),
        }
    }
}

struct Walk<'a, 'f, W> {
    format: &'f Format,
    escape: EscapeStrategy,
    out: &'a mut W,
    scope: NamespaceScope,
}

impl<'a, 'f, W: Write> Walk<'a, 'f, W> {
    fn new(serializer: &XmlSerializer<'f>, out: &'a mut W) -> Self {
        Self {
            format: serializer.format,
            escape: serializer.escape,
            out,
            scope: NamespaceScope::new(),
        }
    }

    fn separator(&mut self) -> fmt::Result {
        self.out.write_str(self.format.line_separator.as_str())
    }

    fn newline(&mut self, layout: Layout<'_>) -> fmt::Result {
        if layout.indent.is_some() {
            self.separator()?;
        }
        Ok(())
    }

    fn indent(&mut self, level: usize, layout: Layout<'_>) -> fmt::Result {
        if let Some(unit) = layout.indent {
            for _ in 0..level {
                self.out.write_str(unit.as_str())?;
            }
        }
        Ok(())
    }

    /// `level - 1` full units plus one unit short by a character.
    fn attribute_indent(&mut self, level: usize, unit: &Indent) -> fmt::Result {
        if level == 0 {
            return Ok(());
        }
        for _ in 1..level {
            self.out.write_str(unit.as_str())?;
        }
        self.out.write_str(unit.short())
    }

    fn document(&mut self, document: &Document) -> fmt::Result {
        self.declaration()?;

        let layout = Layout::configured(self.format);
        for node in &document.children {
            match node {
                Node::Element(element) => self.element(element, 0, layout)?,
                Node::Comment(text) => self.comment(text)?,
                Node::ProcessingInstruction(pi) => self.processing_instruction(pi)?,
                Node::DocType(doctype) => {
                    self.doctype(doctype)?;
                    self.separator()?;
                }
                Node::Text(text) | Node::CData(text) => {
                    if !is_whitespace(text) {
                        warn!("Ignoring text outside the root element: {:?}", text);
                    }
                    continue;
                }
            }
            if self.format.indent.is_some() {
                self.separator()?;
            }
        }

        if !document.children.is_empty() && self.format.indent.is_none() {
            self.separator()?;
        }
        Ok(())
    }

    fn declaration(&mut self) -> fmt::Result {
        if self.format.omit_declaration {
            return Ok(());
        }
        self.out.write_str("<?xml version=\"1.0\"")?;
        if !self.format.omit_encoding {
            write!(self.out, " encoding=\"{}\"", self.format.encoding)?;
        }
        self.out.write_str("?>")?;
        self.separator()
    }

    fn element(&mut self, element: &Element, level: usize, inherited: Layout<'f>) -> fmt::Result {
        let layout = match element.attribute("xml:space") {
            Some("preserve") => Layout::preserve(),
            Some("default") => Layout::configured(self.format),
            _ => inherited,
        };
        let mark = self.scope.mark();
        let qualified = element.qualified_name();
        let children = element.children.as_slice();
        let start = skip_leading_white(children, 0, layout.text_mode);

        write!(self.out, "<{}", qualified)?;
        self.element_namespace(&element.namespace)?;
        for namespace in &element.additional_namespaces {
            self.declare(namespace)?;
        }
        self.attributes(element, level, start < children.len())?;

        if start >= children.len() {
            if self.format.expand_empty_elements {
                write!(self.out, "></{}>", qualified)?;
            } else {
                self.out.write_str(" />")?;
            }
        } else {
            self.out.write_char('>')?;
            if next_non_text(children, start) < children.len() {
                self.newline(layout)?;
                self.content_range(children, start, children.len(), level + 1, layout)?;
                self.newline(layout)?;
                self.indent(level, layout)?;
            } else {
                self.text_range(children, start, children.len(), layout)?;
            }
            write!(self.out, "</{}>", qualified)?;
        }

        self.scope.pop_to(mark);
        Ok(())
    }

    fn element_namespace(&mut self, namespace: &Namespace) -> fmt::Result {
        if namespace.is_xml() {
            return Ok(());
        }
        // An unqualified element needs `xmlns=""` only under a default namespace.
        if namespace.is_none() && self.scope.uri_for("").is_none() {
            return Ok(());
        }
        self.declare(namespace)
    }

    fn declare(&mut self, namespace: &Namespace) -> fmt::Result {
        if namespace.is_xml() || self.scope.is_declared(namespace.prefix(), namespace.uri()) {
            return Ok(());
        }
        write!(self.out, " {}", namespace)?;
        self.scope.push(namespace.clone());
        Ok(())
    }

    fn attributes(&mut self, element: &Element, level: usize, has_content: bool) -> fmt::Result {
        let mut attributes: Vec<&Attribute> = element.attributes().iter().collect();
        if self.format.sort_attributes {
            attributes.sort_by_cached_key(|attr| attr.qualified_name());
        }

        let format = self.format;
        let unit = match &format.indent {
            Some(unit) if format.indent_attributes && !attributes.is_empty() => Some(unit),
            _ => None,
        };

        for attribute in attributes {
            if let Some(unit) = unit {
                self.separator()?;
                self.attribute_indent(level + 1, unit)?;
            }
            if !attribute.namespace.is_none() && !attribute.namespace.is_xml() {
                self.declare(&attribute.namespace)?;
            }
            write!(
                self.out,
                " {}=\"{}\"",
                attribute.qualified_name(),
                self.escape.escape_attribute(&attribute.value)
            )?;
        }

        if let Some(unit) = unit {
            self.separator()?;
            self.attribute_indent(level, unit)?;
            if has_content && level > 0 {
                self.out.write_char(' ')?;
            }
        }
        Ok(())
    }

    fn content_range(
        &mut self,
        children: &[Node],
        start: usize,
        end: usize,
        level: usize,
        layout: Layout<'f>,
    ) -> fmt::Result {
        let mut index = start;
        while index < end {
            let first_node = index == start;
            let node = &children[index];

            if node.is_text() {
                let first = skip_leading_white(&children[..end], index, layout.text_mode);
                index = next_non_text(&children[..end], first);
                if first < index {
                    if !first_node {
                        self.newline(layout)?;
                    }
                    self.indent(level, layout)?;
                    self.text_range(children, first, index, layout)?;
                }
                continue;
            }

            if !first_node {
                self.newline(layout)?;
            }
            self.indent(level, layout)?;
            match node {
                Node::Element(element) => self.element(element, level, layout)?,
                Node::Comment(text) => self.comment(text)?,
                Node::ProcessingInstruction(pi) => self.processing_instruction(pi)?,
                Node::DocType(doctype) => self.doctype(doctype)?,
                Node::Text(_) | Node::CData(_) => {}
            }
            index += 1;
        }
        Ok(())
    }

    fn text_range(
        &mut self,
        children: &[Node],
        start: usize,
        end: usize,
        layout: Layout<'f>,
    ) -> fmt::Result {
        let start = skip_leading_white(children, start, layout.text_mode);
        let end = skip_trailing_white(children, end, layout.text_mode);
        if start >= end {
            return Ok(());
        }

        let mut previous: Option<&str> = None;
        for node in &children[start..end] {
            let (text, is_cdata) = match node {
                Node::Text(text) => (text.as_str(), false),
                Node::CData(text) => (text.as_str(), true),
                _ => continue,
            };
            if text.is_empty() || layout.drops_whitespace_only(text) {
                continue;
            }
            if let Some(previous) = previous
                && layout.pads_adjacent_text()
                && (ends_with_white(previous) || starts_with_white(text))
            {
                self.out.write_char(' ')?;
            }
            let shaped = layout.apply(text);
            if is_cdata {
                write!(self.out, "<![CDATA[{}]]>", shaped)?;
            } else {
                self.out.write_str(&self.escape.escape_text(&shaped))?;
            }
            previous = Some(text);
        }
        Ok(())
    }

    fn comment(&mut self, text: &str) -> fmt::Result {
        write!(self.out, "<!--{}-->", text)
    }

    fn processing_instruction(&mut self, pi: &ProcessingInstruction) -> fmt::Result {
        if pi.data.is_empty() {
            write!(self.out, "<?{}?>", pi.target)
        } else {
            write!(self.out, "<?{} {}?>", pi.target, pi.data)
        }
    }

    fn doctype(&mut self, doctype: &DocType) -> fmt::Result {
        write!(self.out, "<!DOCTYPE {}", doctype.element_name)?;
        if let Some(public_id) = &doctype.public_id {
            write!(self.out, " PUBLIC \"{}\"", public_id)?;
        }
        if let Some(system_id) = &doctype.system_id {
            if doctype.public_id.is_none() {
                self.out.write_str(" SYSTEM")?;
            }
            write!(self.out, " \"{}\"", system_id)?;
        }
        if let Some(subset) = doctype.internal_subset.as_deref().filter(|s| !s.is_empty()) {
            self.out.write_str(" [")?;
            self.separator()?;
            write!(self.out, "{}]", subset)?;
        }
        self.out.write_char('>')
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_whitespace(text: &str) -> bool {
    text.chars().all(is_xml_whitespace)
}

fn is_all_whitespace(node: &Node) -> bool {
    match node {
        Node::Text(text) | Node::CData(text) => is_whitespace(text),
        _ => false,
    }
}

fn starts_with_white(text: &str) -> bool {
    text.chars().next().is_some_and(is_xml_whitespace)
}

fn ends_with_white(text: &str) -> bool {
    text.chars().next_back().is_some_and(is_xml_whitespace)
}

fn trim(text: &str) -> &str {
    text.trim_matches(is_xml_whitespace)
}

fn normalize(text: &str) -> String {
    text.split(is_xml_whitespace)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn skip_leading_white(children: &[Node], start: usize, mode: TextMode) -> usize {
    let mut index = start;
    if mode.skips_whitespace() {
        while index < children.len() && is_all_whitespace(&children[index]) {
            index += 1;
        }
    }
    index
}

fn skip_trailing_white(children: &[Node], end: usize, mode: TextMode) -> usize {
    let mut index = end.min(children.len());
    if mode.skips_whitespace() {
        while index > 0 && is_all_whitespace(&children[index - 1]) {
            index -= 1;
        }
    }
    index
}

fn next_non_text(children: &[Node], start: usize) -> usize {
    let mut index = start;
    while index < children.len() && children[index].is_text() {
        index += 1;
    }
    index
}
