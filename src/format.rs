//! Format configuration model
//!
//! A [`Format`] is the validated, immutable bundle of options the serializer
//! consults. It is normally produced by [`crate::validator::validate`] from a
//! key/value [`crate::properties::Properties`] map, but can also be built
//! directly with the `with_*` methods when the values are known to be valid.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Largest accepted indentation width, in spaces.
pub const MAX_INDENT: usize = 99;

/// Line separator written between lines of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LineSeparator {
    /// `\r`
    Cr,
    /// `\n`
    Lf,
    /// `\r\n`
    #[default]
    CrLf,
}

impl LineSeparator {
    pub fn as_str(self) -> &'static str {
        match self {
            LineSeparator::Cr => "\r",
            LineSeparator::Lf => "\n",
            LineSeparator::CrLf => "\r\n",
        }
    }

    /// Parses one of the three literal separator strings.
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "\r" => Some(LineSeparator::Cr),
            "\n" => Some(LineSeparator::Lf),
            "\r\n" => Some(LineSeparator::CrLf),
            _ => None,
        }
    }
}

/// Whitespace handling applied to text nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextMode {
    /// Text is written exactly as stored; no whitespace is synthesized.
    #[default]
    Preserve,
    /// Trim both ends and collapse internal whitespace runs to one space.
    Normalize,
    /// Trim both ends.
    Trim,
    /// Trim both ends; whitespace-only text nodes are dropped entirely.
    TrimFullWhite,
}

impl TextMode {
    pub const ALL: [TextMode; 4] = [
        TextMode::Preserve,
        TextMode::Normalize,
        TextMode::Trim,
        TextMode::TrimFullWhite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TextMode::Preserve => "PRESERVE",
            TextMode::Normalize => "NORMALIZE",
            TextMode::Trim => "TRIM",
            TextMode::TrimFullWhite => "TRIM_FULL_WHITE",
        }
    }

    /// Whether whitespace-only text nodes are skipped for layout purposes.
    pub fn skips_whitespace(self) -> bool {
        !matches!(self, TextMode::Preserve)
    }
}

impl fmt::Display for TextMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidTextMode {
                value: s.to_string(),
            })
    }
}

/// One level of indentation: between 1 and 99 spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Indent(String);

impl Indent {
    /// Builds an indent unit of `width` spaces.
    ///
    /// Returns `Ok(None)` for a width of zero, which means "no indentation".
    pub fn spaces(width: usize) -> Result<Option<Self>, ConfigError> {
        match width {
            0 => Ok(None),
            1..=MAX_INDENT => Ok(Some(Indent(" ".repeat(width)))),
            _ => Err(ConfigError::InvalidIndent {
                value: width.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// The indent unit without its last character.
    pub(crate) fn short(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }
}

/// Validated formatting options for one serialization call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub encoding: String,
    pub expand_empty_elements: bool,
    pub indent: Option<Indent>,
    pub line_separator: LineSeparator,
    pub omit_declaration: bool,
    pub omit_encoding: bool,
    pub text_mode: TextMode,
    pub sort_attributes: bool,
    pub indent_attributes: bool,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            encoding: "UTF-8".to_string(),
            expand_empty_elements: false,
            indent: None,
            line_separator: LineSeparator::default(),
            omit_declaration: false,
            omit_encoding: false,
            text_mode: TextMode::default(),
            sort_attributes: false,
            indent_attributes: false,
        }
    }
}

impl Format {
    /// Indentation of `width` spaces, or none for zero.
    pub fn with_indent(mut self, width: usize) -> Result<Self, ConfigError> {
        self.indent = Indent::spaces(width)?;
        Ok(self)
    }

    pub fn with_text_mode(mut self, text_mode: TextMode) -> Self {
        self.text_mode = text_mode;
        self
    }

    pub fn with_line_separator(mut self, line_separator: LineSeparator) -> Self {
        self.line_separator = line_separator;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_sort_attributes(mut self, sort_attributes: bool) -> Self {
        self.sort_attributes = sort_attributes;
        self
    }

    pub fn with_indent_attributes(mut self, indent_attributes: bool) -> Self {
        self.indent_attributes = indent_attributes;
        self
    }

    pub fn with_expand_empty_elements(mut self, expand_empty_elements: bool) -> Self {
        self.expand_empty_elements = expand_empty_elements;
        self
    }

    pub fn with_omit_declaration(mut self, omit_declaration: bool) -> Self {
        self.omit_declaration = omit_declaration;
        self
    }

    pub fn with_omit_encoding(mut self, omit_encoding: bool) -> Self {
        self.omit_encoding = omit_encoding;
        self
    }
}
