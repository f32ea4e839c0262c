//! In-memory document tree consumed by the serializer.

use crate::namespace::Namespace;

/// A parsed document: ordered top-level nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding only `root`.
    pub fn with_root(root: Element) -> Self {
        Self {
            children: vec![Node::Element(root)],
        }
    }

    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    /// The first top-level element.
    pub fn root(&self) -> Option<&Element> {
        self.children.iter().find_map(Node::as_element)
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
    DocType(DocType),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text(value.into())
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment(value.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text and CDATA take part in text layout; everything else is
    /// laid out as a block.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_) | Node::CData(_))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

impl ProcessingInstruction {
    pub fn new(target: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocType {
    pub element_name: String,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub internal_subset: Option<String>,
}

impl DocType {
    pub fn new(element_name: impl Into<String>) -> Self {
        Self {
            element_name: element_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub namespace: Namespace,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Namespace::none(),
            value: value.into(),
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn qualified_name(&self) -> String {
        self.namespace.qualify(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub namespace: Namespace,
    /// Declarations carried by this element beyond its own namespace.
    pub additional_namespaces: Vec<Namespace>,
    attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Namespace::none(),
            additional_namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn qualified_name(&self) -> String {
        self.namespace.qualify(&self.name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Adds `attribute`, replacing one with the same qualified name.
    pub fn set_attribute(&mut self, attribute: Attribute) {
        let qualified = attribute.qualified_name();
        match self
            .attributes
            .iter_mut()
            .find(|existing| existing.qualified_name() == qualified)
        {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Value of the attribute with the given qualified name.
    pub fn attribute(&self, qualified_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.qualified_name() == qualified_name)
            .map(|attr| attr.value.as_str())
    }

    pub fn remove_attribute(&mut self, qualified_name: &str) -> Option<Attribute> {
        let index = self
            .attributes
            .iter()
            .position(|attr| attr.qualified_name() == qualified_name)?;
        Some(self.attributes.remove(index))
    }

    /// Stable sort of attributes by qualified name.
    pub fn sort_attributes(&mut self) {
        self.attributes.sort_by_cached_key(Attribute::qualified_name);
    }

    pub fn add_namespace_declaration(&mut self, namespace: Namespace) {
        if !self.additional_namespaces.contains(&namespace) {
            self.additional_namespaces.push(namespace);
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}

impl From<&str> for Element {
    fn from(name: &str) -> Self {
        Element::new(name)
    }
}
