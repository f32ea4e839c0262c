use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult};
use crate::properties::{Properties, keys};
use crate::registry::Registry;
use crate::validator::{Settings, UnknownKeys, ValidationOptions, check_properties, validate};

/// Prefix of environment variables overriding properties.
pub const ENV_PREFIX: &str = "PRETTYXML_";

/// Used when neither `-p` nor a config file provides a base.
pub const FALLBACK_PROPERTIES: [(&str, &str); 2] = [(keys::INDENT, "2"), (keys::TEXT_MODE, "TRIM")];

const CONFIG_NAMES: [&str; 4] = [
    "prettyxml.properties",
    ".prettyxml.properties",
    "prettyxml.toml",
    "prettyxml.json",
];

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A value in a TOML or JSON property file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl RawValue {
    fn into_string(self) -> String {
        match self {
            RawValue::Bool(value) => value.to_string(),
            RawValue::Integer(value) => value.to_string(),
            RawValue::Text(value) => value,
        }
    }
}

/// Environment variable name for a property key: `textMode` becomes
/// `PRETTYXML_TEXT_MODE`.
pub fn env_var_name(key: &str) -> String {
    let mut name = String::from(ENV_PREFIX);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('_');
        }
        name.push(c.to_ascii_uppercase());
    }
    name
}

/// Configuration manager for loading and merging property layers
pub struct ConfigManager;

impl ConfigManager {
    /// Load settings with precedence: base -> environment -> CLI
    pub fn load_settings(cli: &Cli, registry: &Registry) -> ConfigResult<Settings> {
        let properties = Self::load_properties(cli, registry, &SystemEnvProvider)?;
        validate(&properties, ValidationOptions::strict())
    }

    /// Merge all layers without validating the result
    pub fn load_properties(
        cli: &Cli,
        registry: &Registry,
        env: &impl EnvProvider,
    ) -> ConfigResult<Properties> {
        let base = match cli.properties.as_deref() {
            Some(name) => Self::resolve_named(name, registry)?,
            None => match Self::find_config_file(&Self::search_dirs()) {
                Some(path) => {
                    info!("Using configuration file {}", path.display());
                    Self::load_from_file(&path)?
                }
                None => Self::fallback_properties(),
            },
        };

        let properties = Self::apply_environment_overrides_with(env, base);
        Ok(Self::merge_with_cli(properties, cli))
    }

    /// A preset from the registry, or else a property file at that path
    pub fn resolve_named(name: &str, registry: &Registry) -> ConfigResult<Properties> {
        if let Some(preset) = registry.preset(name) {
            debug!("Using preset {}", name);
            return Ok(preset.clone());
        }
        let path = Path::new(name);
        if path.is_file() {
            debug!("Using property file {}", path.display());
            return Self::load_from_file(path);
        }
        Err(ConfigError::UnknownPreset {
            name: name.to_string(),
        })
    }

    pub fn fallback_properties() -> Properties {
        FALLBACK_PROPERTIES.into_iter().collect()
    }

    /// Load properties from a file (.properties or no extension, TOML or JSON)
    pub fn load_from_file(path: &Path) -> ConfigResult<Properties> {
        let content = fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("properties") | None => Properties::parse(&content),
            Some("toml") => {
                let table: BTreeMap<String, RawValue> = toml::from_str(&content)?;
                Ok(Self::from_table(table))
            }
            Some("json") => {
                let table: BTreeMap<String, RawValue> = serde_json::from_str(&content)?;
                Ok(Self::from_table(table))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    fn from_table(table: BTreeMap<String, RawValue>) -> Properties {
        table
            .into_iter()
            .map(|(key, value)| (key, value.into_string()))
            .collect()
    }

    /// Current directory, then the user configuration directory
    pub fn search_dirs() -> Vec<PathBuf> {
        let mut dirs = vec![PathBuf::from(".")];
        if let Some(config_dir) = dirs::config_dir() {
            dirs.push(config_dir.join("prettyxml"));
        }
        dirs
    }

    /// First well-known config file found in `dirs`
    pub fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
        dirs.iter()
            .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
            .find(|path| path.is_file())
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(properties: Properties) -> Properties {
        Self::apply_environment_overrides_with(&SystemEnvProvider, properties)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut properties: Properties,
    ) -> Properties {
        for key in keys::BASIC.iter().chain(keys::EXTENDED.iter()) {
            let name = env_var_name(key);
            if let Some(value) = env.get(&name) {
                debug!("{} overrides {}", name, key);
                properties.set(*key, value);
            }
        }
        properties
    }

    /// Merge CLI arguments with properties (CLI takes precedence)
    pub fn merge_with_cli(mut properties: Properties, cli: &Cli) -> Properties {
        properties.extend_from(&cli.overrides());
        properties
    }

    /// Store the format part of `properties` in `path`
    pub fn save_properties(properties: &Properties, path: &Path) -> ConfigResult<()> {
        let options = ValidationOptions {
            unknown_keys: UnknownKeys::Reject,
            extended: false,
        };
        check_properties(properties, options)?.store(path)?;
        info!("Stored properties in {}", path.display());
        Ok(())
    }
}
