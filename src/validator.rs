//! Property validation
//!
//! Turns untrusted [`Properties`] into a [`Settings`] bundle holding a
//! validated [`Format`]. All configuration errors surface here, before any
//! document is read or written.

use std::path::PathBuf;

use log::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::format::{Format, Indent, LineSeparator, MAX_INDENT, TextMode};
use crate::properties::{Properties, keys};

/// What to do with keys the validator does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Fail with [`ConfigError::UnknownKey`].
    #[default]
    Reject,
    /// Silently drop them.
    Drop,
}

/// Validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationOptions {
    pub unknown_keys: UnknownKeys,
    /// Keep and check `input`, `url` and `output`; otherwise they are
    /// stripped, as for reusable presets.
    pub extended: bool,
}

impl ValidationOptions {
    /// Interactive property files and CLI runs.
    pub fn strict() -> Self {
        Self {
            unknown_keys: UnknownKeys::Reject,
            extended: true,
        }
    }

    /// Bundled presets.
    pub fn preset() -> Self {
        Self {
            unknown_keys: UnknownKeys::Drop,
            extended: false,
        }
    }
}

/// Where the document is read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputSource {
    #[default]
    Stdin,
    File(PathBuf),
    Url(String),
}

/// Everything a run needs, derived from validated properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub format: Format,
    pub transform: Option<String>,
    pub input: InputSource,
    pub output: Option<PathBuf>,
    /// The normalized properties the settings were built from.
    pub properties: Properties,
}

const BOOLEAN_KEYS: [&str; 5] = [
    keys::EXPAND_EMPTY_ELEMENTS,
    keys::OMIT_DECLARATION,
    keys::OMIT_ENCODING,
    keys::INDENT_ATTRIBUTES,
    keys::SORT_ATTRIBUTES,
];

/// Checks and normalizes properties without building a [`Format`].
///
/// Present booleans become `true`/`false`, `indent=0` is removed, string
/// properties are trimmed and dropped when empty.
pub fn check_properties(
    properties: &Properties,
    options: ValidationOptions,
) -> ConfigResult<Properties> {
    let mut checked = Properties::new();
    for (key, value) in properties.iter() {
        if keys::is_known(key) {
            checked.set(key, value);
            continue;
        }
        match options.unknown_keys {
            UnknownKeys::Reject => {
                return Err(ConfigError::UnknownKey {
                    key: key.to_string(),
                });
            }
            UnknownKeys::Drop => debug!("Dropping unknown property {}={}", key, value),
        }
    }

    for key in BOOLEAN_KEYS {
        check_boolean(key, &mut checked)?;
    }
    check_indent(&mut checked)?;
    check_line_separator(&checked)?;
    check_text_mode(&checked)?;
    check_encoding(&mut checked)?;
    check_string(keys::TRANSFORM, &mut checked);

    if options.extended {
        for key in keys::EXTENDED {
            check_string(key, &mut checked);
        }
        if checked.contains_key(keys::INPUT) && checked.contains_key(keys::URL) {
            return Err(ConfigError::MutuallyExclusive {
                first: keys::INPUT.to_string(),
                second: keys::URL.to_string(),
            });
        }
    } else {
        for key in keys::EXTENDED {
            checked.remove(key);
        }
    }

    Ok(checked)
}

/// Validates properties and builds the run settings.
pub fn validate(properties: &Properties, options: ValidationOptions) -> ConfigResult<Settings> {
    let checked = check_properties(properties, options)?;
    let format = build_format(&checked)?;

    let input = if let Some(path) = checked.get(keys::INPUT) {
        InputSource::File(PathBuf::from(path))
    } else if let Some(url) = checked.get(keys::URL) {
        InputSource::Url(url.to_string())
    } else {
        InputSource::Stdin
    };

    Ok(Settings {
        format,
        transform: checked.get(keys::TRANSFORM).map(str::to_string),
        input,
        output: checked.get(keys::OUTPUT).map(PathBuf::from),
        properties: checked,
    })
}

/// Builds a [`Format`] from properties already normalized by
/// [`check_properties`]; absent keys keep their defaults.
pub fn build_format(checked: &Properties) -> ConfigResult<Format> {
    let mut format = Format::default();

    if let Some(encoding) = checked.get(keys::ENCODING) {
        format.encoding = encoding.to_string();
    }
    if let Some(indent) = checked.get(keys::INDENT) {
        format.indent = Indent::spaces(parse_indent(indent)?)?;
    }
    if let Some(separator) = checked.get(keys::LINE_SEPARATOR) {
        format.line_separator = parse_line_separator(separator)?;
    }
    if let Some(mode) = checked.get(keys::TEXT_MODE) {
        format.text_mode = mode.parse::<TextMode>()?;
    }
    format.expand_empty_elements = flag(checked, keys::EXPAND_EMPTY_ELEMENTS);
    format.omit_declaration = flag(checked, keys::OMIT_DECLARATION);
    format.omit_encoding = flag(checked, keys::OMIT_ENCODING);
    format.sort_attributes = flag(checked, keys::SORT_ATTRIBUTES);
    format.indent_attributes = flag(checked, keys::INDENT_ATTRIBUTES);

    Ok(format)
}

fn flag(checked: &Properties, key: &str) -> bool {
    checked.get(key) == Some("true")
}

fn check_boolean(key: &str, properties: &mut Properties) -> ConfigResult<()> {
    let Some(value) = properties.get(key) else {
        return Ok(());
    };
    let normalized = if value.eq_ignore_ascii_case("true") {
        "true"
    } else if value.eq_ignore_ascii_case("false") {
        "false"
    } else {
        return Err(ConfigError::InvalidBoolean {
            key: key.to_string(),
            value: value.to_string(),
        });
    };
    properties.set(key, normalized);
    Ok(())
}

fn parse_indent(value: &str) -> ConfigResult<usize> {
    let invalid = || ConfigError::InvalidIndent {
        value: value.to_string(),
    };
    let width: i64 = value.parse().map_err(|_| invalid())?;
    if !(0..=MAX_INDENT as i64).contains(&width) {
        return Err(invalid());
    }
    Ok(width as usize)
}

fn check_indent(properties: &mut Properties) -> ConfigResult<()> {
    if let Some(value) = properties.get(keys::INDENT)
        && parse_indent(value)? == 0
    {
        properties.remove(keys::INDENT);
    }
    Ok(())
}

fn parse_line_separator(value: &str) -> ConfigResult<LineSeparator> {
    LineSeparator::from_literal(value).ok_or_else(|| ConfigError::InvalidLineSeparator {
        value: value.to_string(),
    })
}

fn check_line_separator(properties: &Properties) -> ConfigResult<()> {
    if let Some(value) = properties.get(keys::LINE_SEPARATOR) {
        parse_line_separator(value)?;
    }
    Ok(())
}

fn check_text_mode(properties: &Properties) -> ConfigResult<()> {
    if let Some(value) = properties.get(keys::TEXT_MODE) {
        value.parse::<TextMode>()?;
    }
    Ok(())
}

fn check_encoding(properties: &mut Properties) -> ConfigResult<()> {
    let Some(value) = properties.get(keys::ENCODING) else {
        return Ok(());
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: keys::ENCODING.to_string(),
            value: value.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    let trimmed = trimmed.to_string();
    properties.set(keys::ENCODING, trimmed);
    Ok(())
}

fn check_string(key: &str, properties: &mut Properties) {
    let Some(value) = properties.get(key) else {
        return;
    };
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        properties.remove(key);
    } else {
        properties.set(key, trimmed);
    }
}
