//! Flat `key=value` configuration
//!
//! Properties are the raw, untrusted form of a format configuration: what
//! property files, presets, environment variables and CLI flags produce
//! before the validator turns them into a [`crate::format::Format`].

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Property keys understood by the validator.
pub mod keys {
    pub const ENCODING: &str = "encoding";
    pub const EXPAND_EMPTY_ELEMENTS: &str = "expandEmptyElements";
    pub const INDENT: &str = "indent";
    pub const LINE_SEPARATOR: &str = "lineSeparator";
    pub const OMIT_DECLARATION: &str = "omitDeclaration";
    pub const OMIT_ENCODING: &str = "omitEncoding";
    pub const TEXT_MODE: &str = "textMode";
    pub const SORT_ATTRIBUTES: &str = "sortAttributes";
    pub const INDENT_ATTRIBUTES: &str = "indentAttributes";
    pub const TRANSFORM: &str = "transform";
    pub const INPUT: &str = "input";
    pub const URL: &str = "url";
    pub const OUTPUT: &str = "output";

    /// Keys describing format and handling.
    pub const BASIC: [&str; 10] = [
        ENCODING,
        EXPAND_EMPTY_ELEMENTS,
        INDENT,
        LINE_SEPARATOR,
        OMIT_DECLARATION,
        OMIT_ENCODING,
        TEXT_MODE,
        SORT_ATTRIBUTES,
        INDENT_ATTRIBUTES,
        TRANSFORM,
    ];

    /// Keys describing where the document comes from and goes to.
    pub const EXTENDED: [&str; 3] = [INPUT, URL, OUTPUT];

    pub fn is_known(key: &str) -> bool {
        BASIC.contains(&key) || EXTENDED.contains(&key)
    }
}

/// An ordered string-to-string map of configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies every entry of `other` over this map.
    pub fn extend_from(&mut self, other: &Properties) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    /// Parses `key=value` text.
    ///
    /// Blank lines and lines starting with `#` or `!` are ignored. The key
    /// ends at the first `=` or `:`; surrounding whitespace of the key and
    /// leading whitespace of the value are dropped. Values may use the
    /// escapes `\r`, `\n`, `\t` and `\\`.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut properties = Properties::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_start();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some(split) = line.find(['=', ':']) else {
                return Err(ConfigError::MalformedLine {
                    line: index + 1,
                    content: raw.to_string(),
                });
            };
            let key = line[..split].trim_end();
            if key.is_empty() {
                return Err(ConfigError::MalformedLine {
                    line: index + 1,
                    content: raw.to_string(),
                });
            }
            let value = unescape(line[split + 1..].trim_start());
            properties.set(key, value);
        }
        Ok(properties)
    }

    /// Reads a properties file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Renders the properties as `key=value` lines under a version header.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# prettyxml {}", env!("CARGO_PKG_VERSION"));
        for (key, value) in self.iter() {
            let _ = writeln!(out, "{}={}", key, escape(value));
        }
        out
    }

    /// Writes the properties to `path`, replacing any existing file.
    pub fn store(&self, path: &Path) -> ConfigResult<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (key, value) in iter {
            properties.set(key, value);
        }
        properties
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}
