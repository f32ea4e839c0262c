use clap::Parser;
use tempfile::TempDir;

use prettyxml::config::env_var_name;
use prettyxml::{
    Cli, ConfigError, ConfigManager, InputSource, Properties, Registry, TextMode,
    ValidationOptions, validate,
};

use crate::common::mocks::MockEnvProvider;
use crate::common::test_helpers::{TestFixtures, path_str, properties, write_file};

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("prettyxml").chain(args.iter().copied()))
        .expect("valid test arguments")
}

#[test]
fn test_load_fixture_properties_file() {
    let fixtures = TestFixtures::new();
    let loaded = ConfigManager::load_from_file(&fixtures.properties_config()).unwrap();

    let settings = validate(&loaded, ValidationOptions::strict()).unwrap();
    assert_eq!(settings.format.indent.map(|i| i.width()), Some(4));
    assert!(settings.format.sort_attributes);
    assert_eq!(settings.format.line_separator.as_str(), "\n");
}

#[test]
fn test_load_fixture_toml_and_json() {
    let fixtures = TestFixtures::new();

    let toml = ConfigManager::load_from_file(&fixtures.toml_config()).unwrap();
    let settings = validate(&toml, ValidationOptions::strict()).unwrap();
    assert_eq!(settings.format.text_mode, TextMode::Normalize);
    assert_eq!(settings.format.line_separator.as_str(), "\n");

    let json = ConfigManager::load_from_file(&fixtures.json_config()).unwrap();
    let settings = validate(&json, ValidationOptions::strict()).unwrap();
    assert!(settings.format.indent_attributes);
    assert!(settings.format.omit_declaration);
}

#[test]
fn test_property_file_named_by_cli() {
    let fixtures = TestFixtures::new();
    let registry = Registry::builtin().unwrap();
    let args = cli(&["-p", path_str(&fixtures.toml_config()), "-n", "6"]);

    let merged =
        ConfigManager::load_properties(&args, &registry, &MockEnvProvider::new()).unwrap();
    assert_eq!(merged.get("indent"), Some("6"));
    assert_eq!(merged.get("textMode"), Some("NORMALIZE"));
}

#[test]
fn test_layer_precedence() {
    let registry = Registry::builtin().unwrap();
    let mut env = MockEnvProvider::new();
    env.set(env_var_name("sortAttributes"), "false");
    env.set(env_var_name("omitDeclaration"), "true");
    env.set(env_var_name("input"), "from-env.xml");

    let args = cli(&["-p", "raw", "-s", "-i", "from-cli.xml"]);
    let merged = ConfigManager::load_properties(&args, &registry, &env).unwrap();

    // preset
    assert_eq!(merged.get("textMode"), Some("PRESERVE"));
    // environment
    assert_eq!(merged.get("omitDeclaration"), Some("true"));
    // command line over environment
    assert_eq!(merged.get("sortAttributes"), Some("true"));
    assert_eq!(merged.get("input"), Some("from-cli.xml"));
}

#[test]
fn test_cli_url_with_environment_input_is_exclusive() {
    let registry = Registry::builtin().unwrap();
    let mut env = MockEnvProvider::new();
    env.set("PRETTYXML_INPUT", "a.xml");

    let args = cli(&["-p", "pretty", "-u", "http://localhost/b.xml"]);
    let merged = ConfigManager::load_properties(&args, &registry, &env).unwrap();

    assert!(matches!(
        validate(&merged, ValidationOptions::strict()),
        Err(ConfigError::MutuallyExclusive { .. })
    ));
}

#[test]
fn test_url_alone_is_accepted() {
    let registry = Registry::builtin().unwrap();
    let args = cli(&["-p", "pretty", "-u", "http://localhost/b.xml"]);
    let merged =
        ConfigManager::load_properties(&args, &registry, &MockEnvProvider::new()).unwrap();

    let settings = validate(&merged, ValidationOptions::strict()).unwrap();
    assert_eq!(
        settings.input,
        InputSource::Url("http://localhost/b.xml".to_string())
    );
}

#[test]
fn test_invalid_cli_indent_is_reported_by_validation() {
    let registry = Registry::builtin().unwrap();
    let args = cli(&["-p", "pretty", "-n", "100"]);
    let merged =
        ConfigManager::load_properties(&args, &registry, &MockEnvProvider::new()).unwrap();

    assert!(matches!(
        validate(&merged, ValidationOptions::strict()),
        Err(ConfigError::InvalidIndent { .. })
    ));
}

#[test]
fn test_extensionless_file_is_read_as_properties() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "prettyxmlrc", "indent: 3\n! comment\n");

    let loaded = ConfigManager::load_from_file(&path).unwrap();
    assert_eq!(loaded.get("indent"), Some("3"));
    assert_eq!(loaded.len(), 1);
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "broken.toml", "indent = [");

    assert!(matches!(
        ConfigManager::load_from_file(&path),
        Err(ConfigError::TomlParsing(_))
    ));
}

#[test]
fn test_malformed_json_is_a_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(&temp_dir, "broken.json", "{\"indent\": ");

    assert!(matches!(
        ConfigManager::load_from_file(&path),
        Err(ConfigError::JsonParsing(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = ConfigManager::load_from_file(std::path::Path::new("/no/such/file.properties"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_saved_properties_round_trip_through_cli() {
    let temp_dir = TempDir::new().unwrap();
    let saved = temp_dir.path().join("saved.properties");
    let stored = properties(&[
        ("indent", "4"),
        ("lineSeparator", "\n"),
        ("sortAttributes", "TRUE"),
        ("output", "out.xml"),
    ]);

    ConfigManager::save_properties(&stored, &saved).unwrap();

    let registry = Registry::empty();
    let args = cli(&["-p", path_str(&saved)]);
    let merged =
        ConfigManager::load_properties(&args, &registry, &MockEnvProvider::new()).unwrap();
    let settings = validate(&merged, ValidationOptions::strict()).unwrap();

    assert_eq!(settings.format.indent.map(|i| i.width()), Some(4));
    assert_eq!(settings.format.line_separator.as_str(), "\n");
    assert!(settings.format.sort_attributes);
    assert_eq!(settings.output, None);
}

#[test]
fn test_save_rejects_unknown_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("saved.properties");
    let stored: Properties = properties(&[("indent", "2"), ("colour", "blue")]);

    assert!(matches!(
        ConfigManager::save_properties(&stored, &path),
        Err(ConfigError::UnknownKey { .. })
    ));
    assert!(!path.exists());
}
