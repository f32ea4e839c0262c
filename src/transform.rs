//! Transform pipeline
//!
//! A pipeline is a `;`-separated list of transform identifiers. Each one is
//! looked up, in order of preference, as a builtin transform from the
//! [`Registry`], a stylesheet file on disk, or a stylesheet bundled in the
//! registry. Stylesheets are compiled by a [`TransformEngine`]. All
//! identifiers are resolved before the first transform runs.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::debug;

use crate::error::{TransformError, TransformResult};
use crate::registry::Registry;
use crate::tree::{Document, Element, Node};

/// Names of the lookup tiers, in resolution order.
pub const TIERS: &str = "builtin, file, resource";

/// One document-to-document step.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, document: Document) -> TransformResult<Document>;
}

/// Compiles stylesheet text into a [`Transform`].
pub trait TransformEngine: Send + Sync {
    fn compile(&self, name: &str, stylesheet: &str) -> TransformResult<Arc<dyn Transform>>;
}

/// Engine used when no stylesheet processor is available: every compile
/// fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableEngine;

impl TransformEngine for UnavailableEngine {
    fn compile(&self, name: &str, _stylesheet: &str) -> TransformResult<Arc<dyn Transform>> {
        Err(TransformError::Compile {
            name: name.to_string(),
            details: "no stylesheet engine is available".to_string(),
        })
    }
}

/// Where an identifier was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Builtin,
    File,
    Resource,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Builtin => "builtin",
            Tier::File => "file",
            Tier::Resource => "resource",
        })
    }
}

pub struct TransformPipeline<'a> {
    registry: &'a Registry,
    engine: &'a dyn TransformEngine,
}

impl<'a> TransformPipeline<'a> {
    pub fn new(registry: &'a Registry, engine: &'a dyn TransformEngine) -> Self {
        Self { registry, engine }
    }

    /// Runs every transform named in `list` over `document`, in order.
    /// An absent or blank list returns the document unchanged.
    pub fn apply(&self, list: Option<&str>, document: Document) -> TransformResult<Document> {
        let Some(list) = list else {
            return Ok(document);
        };
        let transforms = self.resolve_all(list)?;

        let mut document = document;
        for transform in transforms {
            debug!("Applying transform {}", transform.name());
            document = transform.apply(document)?;
        }
        Ok(document)
    }

    /// Resolves every identifier of `list`; empty identifiers are skipped.
    pub fn resolve_all(&self, list: &str) -> TransformResult<Vec<Arc<dyn Transform>>> {
        list.split(';')
            .map(str::trim)
            .filter(|identifier| !identifier.is_empty())
            .map(|identifier| self.resolve(identifier).map(|(transform, _)| transform))
            .collect()
    }

    pub fn resolve(&self, identifier: &str) -> TransformResult<(Arc<dyn Transform>, Tier)> {
        if let Some(transform) = self.registry.transform(identifier) {
            debug!("Transform {} resolved as builtin", identifier);
            return Ok((transform, Tier::Builtin));
        }

        let path = Path::new(identifier);
        if path.is_file() {
            debug!("Transform {} resolved as file", identifier);
            let stylesheet = fs::read_to_string(path).map_err(|source| TransformError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            return Ok((self.engine.compile(identifier, &stylesheet)?, Tier::File));
        }

        if let Some(stylesheet) = self.registry.resource(identifier) {
            debug!("Transform {} resolved as resource", identifier);
            return Ok((self.engine.compile(identifier, stylesheet)?, Tier::Resource));
        }

        Err(TransformError::NotFound {
            identifier: identifier.to_string(),
            tiers: TIERS.to_string(),
        })
    }
}

/// Sorts the attributes of every element by qualified name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortAttributes;

impl Transform for SortAttributes {
    fn name(&self) -> &str {
        "sort-attributes"
    }

    fn apply(&self, mut document: Document) -> TransformResult<Document> {
        for_each_element(&mut document.children, &mut Element::sort_attributes);
        Ok(document)
    }
}

/// Stable sort of element children by qualified name; other nodes keep
/// their positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortElements;

impl Transform for SortElements {
    fn name(&self) -> &str {
        "sort-elements"
    }

    fn apply(&self, mut document: Document) -> TransformResult<Document> {
        for_each_element(&mut document.children, &mut |element: &mut Element| {
            sort_element_slots(&mut element.children)
        });
        Ok(document)
    }
}

/// Removes comments anywhere in the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct StripComments;

impl Transform for StripComments {
    fn name(&self) -> &str {
        "strip-comments"
    }

    fn apply(&self, mut document: Document) -> TransformResult<Document> {
        strip_comments(&mut document.children);
        Ok(document)
    }
}

fn for_each_element(nodes: &mut [Node], visit: &mut dyn FnMut(&mut Element)) {
    for node in nodes {
        if let Node::Element(element) = node {
            visit(element);
            for_each_element(&mut element.children, visit);
        }
    }
}

fn sort_element_slots(children: &mut Vec<Node>) {
    let slots: Vec<usize> = children
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node, Node::Element(_)))
        .map(|(index, _)| index)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut elements: Vec<Node> = slots
        .iter()
        .map(|&index| std::mem::replace(&mut children[index], Node::Text(String::new())))
        .collect();
    elements.sort_by_cached_key(|node| match node {
        Node::Element(element) => element.qualified_name(),
        _ => String::new(),
    });
    for (index, element) in slots.into_iter().zip(elements) {
        children[index] = element;
    }
}

fn strip_comments(nodes: &mut Vec<Node>) {
    nodes.retain(|node| !matches!(node, Node::Comment(_)));
    for node in nodes {
        if let Node::Element(element) = node {
            strip_comments(&mut element.children);
        }
    }
}
