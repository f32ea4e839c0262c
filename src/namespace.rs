//! Namespaces and the scope of prefix bindings seen during a tree walk.

use std::fmt;

/// URI bound to the reserved `xml` prefix.
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// A prefix/URI pair. The empty/empty pair means "no namespace".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Namespace {
    prefix: String,
    uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// The unbound namespace.
    pub fn none() -> Self {
        Self::default()
    }

    /// The `xml` prefix and its fixed URI.
    pub fn xml() -> Self {
        Self::new("xml", XML_NAMESPACE_URI)
    }

    /// A default (unprefixed) namespace.
    pub fn default_for(uri: impl Into<String>) -> Self {
        Self::new("", uri)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_none(&self) -> bool {
        self.prefix.is_empty() && self.uri.is_empty()
    }

    pub fn is_xml(&self) -> bool {
        self.prefix == "xml" && self.uri == XML_NAMESPACE_URI
    }

    /// `prefix:local` or just `local`.
    pub fn qualify(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "xmlns=\"{}\"", self.uri)
        } else {
            write!(f, "xmlns:{}=\"{}\"", self.prefix, self.uri)
        }
    }
}

/// Stack of namespace bindings active at the current point of a
/// depth-first walk. The innermost binding of a prefix shadows outer ones.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    bindings: Vec<Namespace>,
}

impl NamespaceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the innermost binding of `prefix` is exactly `uri`.
    pub fn is_declared(&self, prefix: &str, uri: &str) -> bool {
        self.uri_for(prefix) == Some(uri)
    }

    /// The innermost URI bound to `prefix`.
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.uri.as_str())
    }

    pub fn push(&mut self, namespace: Namespace) {
        self.bindings.push(namespace);
    }

    /// Removes the innermost binding.
    pub fn pop(&mut self) -> Option<Namespace> {
        self.bindings.pop()
    }

    /// Current depth of the binding stack, to be handed back to
    /// [`NamespaceScope::pop_to`] on scope exit.
    pub fn mark(&self) -> usize {
        self.bindings.len()
    }

    /// Drops every binding pushed since `mark`.
    pub fn pop_to(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
