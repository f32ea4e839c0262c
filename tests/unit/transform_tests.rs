use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use prettyxml::transform::TIERS;
use prettyxml::{
    Registry, Tier, TransformError, TransformPipeline, UnavailableEngine, parse_str, serialize,
};

use crate::common::mocks::{MockEngine, RenameRoot};
use crate::common::test_helpers::{path_str, plain_format, write_file};

#[test]
fn test_builtins_never_reach_the_engine() {
    let registry = Registry::builtin().unwrap();
    let mut engine = MockEngine::new();
    engine.expect_compile().never();

    let pipeline = TransformPipeline::new(&registry, &engine);
    let (transform, tier) = pipeline.resolve("sort-elements").unwrap();
    assert_eq!(tier, Tier::Builtin);
    assert_eq!(transform.name(), "sort-elements");
}

#[test]
fn test_file_tier_compiles_stylesheet_text() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "rename.xslt", "<xsl:stylesheet/>");
    let identifier = path_str(&path).to_string();
    let expected_name = identifier.clone();

    let registry = Registry::builtin().unwrap();
    let mut engine = MockEngine::new();
    engine
        .expect_compile()
        .withf(move |name, text| name == expected_name && text == "<xsl:stylesheet/>")
        .times(1)
        .returning(|name, _| Ok(Arc::new(RenameRoot::new(name, "renamed"))));

    let pipeline = TransformPipeline::new(&registry, &engine);
    let document = pipeline
        .apply(Some(&identifier), parse_str("<a/>").unwrap())
        .unwrap();
    assert_eq!(serialize(&document, &plain_format()), "<renamed />\n");
}

#[test]
fn test_resource_tier_uses_bundled_stylesheet() {
    let registry = Registry::builtin().unwrap();
    let stylesheet = registry.resource("identity.xslt").unwrap().to_string();

    let mut engine = MockEngine::new();
    engine
        .expect_compile()
        .withf(move |name, text| name == "identity.xslt" && text == stylesheet)
        .times(1)
        .returning(|name, _| Ok(Arc::new(RenameRoot::new(name, "same"))));

    let pipeline = TransformPipeline::new(&registry, &engine);
    let (transform, tier) = pipeline.resolve("identity.xslt").unwrap();
    assert_eq!(tier, Tier::Resource);
    assert_eq!(transform.name(), "identity.xslt");
}

#[test]
fn test_all_identifiers_resolve_before_any_runs() {
    let registry = Registry::builtin().unwrap();
    let mut engine = MockEngine::new();
    engine.expect_compile().never();

    let pipeline = TransformPipeline::new(&registry, &engine);
    let result = pipeline.apply(
        Some("strip-comments; missing-transform"),
        parse_str("<a><!--x--></a>").unwrap(),
    );
    match result {
        Err(TransformError::NotFound { identifier, tiers }) => {
            assert_eq!(identifier, "missing-transform");
            assert_eq!(tiers, TIERS);
        }
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_compile_failure_propagates_unchanged() {
    let registry = Registry::builtin().unwrap();
    let engine = UnavailableEngine;
    let pipeline = TransformPipeline::new(&registry, &engine);

    assert!(matches!(
        pipeline.resolve("identity.xslt"),
        Err(TransformError::Compile { name, .. }) if name == "identity.xslt"
    ));
}

#[test]
fn test_unreadable_stylesheet_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("binary.xslt");
    fs::write(&path, [0xFF, 0xFE, 0x00]).unwrap();

    let registry = Registry::empty();
    let pipeline = TransformPipeline::new(&registry, &UnavailableEngine);
    assert!(matches!(
        pipeline.resolve(path_str(&path)),
        Err(TransformError::Io { .. })
    ));
}

#[test]
fn test_builtin_chain_in_order() {
    let registry = Registry::builtin().unwrap();
    let pipeline = TransformPipeline::new(&registry, &UnavailableEngine);

    let document = parse_str(r#"<r><!--c--><z b="2" a="1"/><y/></r>"#).unwrap();
    let document = pipeline
        .apply(Some("strip-comments;sort-elements;;sort-attributes"), document)
        .unwrap();
    assert_eq!(
        serialize(&document, &plain_format()),
        "<r><y /><z a=\"1\" b=\"2\" /></r>\n"
    );
}

#[test]
fn test_absent_spec_is_identity() {
    let registry = Registry::empty();
    let pipeline = TransformPipeline::new(&registry, &UnavailableEngine);
    let document = parse_str("<a><!--keep--></a>").unwrap();

    let result = pipeline.apply(None, document.clone()).unwrap();
    assert_eq!(result, document);
}
