use prettyxml::namespace::XML_NAMESPACE_URI;
use prettyxml::{Element, Namespace, NamespaceScope, parse_str, serialize};

use crate::common::test_helpers::{indented_format, plain_format};

#[test]
fn test_scope_follows_element_nesting() {
    let mut scope = NamespaceScope::new();
    scope.push(Namespace::new("p", "urn:one"));

    let mark = scope.mark();
    scope.push(Namespace::new("p", "urn:two"));
    scope.push(Namespace::default_for("urn:default"));
    assert!(scope.is_declared("p", "urn:two"));
    assert!(!scope.is_declared("p", "urn:one"));
    assert_eq!(scope.uri_for(""), Some("urn:default"));

    scope.pop_to(mark);
    assert!(scope.is_declared("p", "urn:one"));
    assert_eq!(scope.uri_for(""), None);
    assert_eq!(scope.len(), 1);
}

#[test]
fn test_xml_namespace_is_implicit() {
    let xml = Namespace::xml();
    assert!(xml.is_xml());
    assert_eq!(xml.uri(), XML_NAMESPACE_URI);
    assert_eq!(xml.qualify("lang"), "xml:lang");
}

#[test]
fn test_root_declaration_is_not_repeated() {
    let document = parse_str(r#"<r xmlns:p="urn:p"><p:c><p:d/></p:c></r>"#).unwrap();
    assert_eq!(
        serialize(&document, &indented_format(2)),
        "<r xmlns:p=\"urn:p\">\n  <p:c>\n    <p:d />\n  </p:c>\n</r>\n"
    );
}

#[test]
fn test_rebound_prefix_is_declared_again() {
    let document = parse_str(r#"<r xmlns:p="urn:p"><p:c xmlns:p="urn:other"/></r>"#).unwrap();
    assert_eq!(
        serialize(&document, &plain_format()),
        "<r xmlns:p=\"urn:p\"><p:c xmlns:p=\"urn:other\" /></r>\n"
    );
}

#[test]
fn test_sibling_declarations_do_not_leak() {
    let p = Namespace::new("p", "urn:p");
    let root = Element::new("r")
        .with_child(Element::new("a").with_namespace(p.clone()))
        .with_child(Element::new("b").with_namespace(p));

    assert_eq!(
        serialize(&prettyxml::Document::with_root(root), &plain_format()),
        "<r><p:a xmlns:p=\"urn:p\" /><p:b xmlns:p=\"urn:p\" /></r>\n"
    );
}

#[test]
fn test_unqualified_child_of_default_namespace_resets_it() {
    let root = Element::new("r")
        .with_namespace(Namespace::default_for("urn:d"))
        .with_child(Element::new("plain"));

    assert_eq!(
        serialize(&prettyxml::Document::with_root(root), &plain_format()),
        "<r xmlns=\"urn:d\"><plain xmlns=\"\" /></r>\n"
    );
}

#[test]
fn test_attribute_namespace_is_declared_on_its_element() {
    let document = parse_str(r#"<r><c xmlns:q="urn:q" q:a="1"/></r>"#).unwrap();
    assert_eq!(
        serialize(&document, &plain_format()),
        "<r><c xmlns:q=\"urn:q\" q:a=\"1\" /></r>\n"
    );
}
