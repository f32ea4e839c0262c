use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum PrettyXmlError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("XML input error: {0}")]
    Source(#[from] SourceError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url}: {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Unsupported output encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    #[error("Cannot write output file: {path} - {details}")]
    OutputFile { path: PathBuf, details: String },
}

/// Configuration and property validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Unknown property: {key}")]
    UnknownKey { key: String },

    #[error("value of property {key} must be true or false, was: {value}")]
    InvalidBoolean { key: String, value: String },

    #[error("indent must be an integer >= 0 and < 100, was: {value}")]
    InvalidIndent { value: String },

    #[error("lineSeparator must be \\r, \\n or \\r\\n, was: {value:?}")]
    InvalidLineSeparator { value: String },

    #[error("textMode must be NORMALIZE, TRIM, TRIM_FULL_WHITE or PRESERVE, was: {value}")]
    InvalidTextMode { value: String },

    #[error("Invalid property value: {key} = {value:?} - {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("do not use {first} and {second} at the same time")]
    MutuallyExclusive { first: String, second: String },

    #[error("Malformed property line {line}: {content}")]
    MalformedLine { line: usize, content: String },

    #[error("Unknown preset or property file: {name}")]
    UnknownPreset { name: String },

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Transform pipeline errors
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("cannot find transform {identifier} (looked in: {tiers})")]
    NotFound { identifier: String, tiers: String },

    #[error("cannot read stylesheet {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot compile stylesheet {name}: {details}")]
    Compile { name: String, details: String },

    #[error("transform {name} failed: {details}")]
    Evaluation { name: String, details: String },
}

/// Errors raised while building a document tree from XML text
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("malformed escape sequence: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    #[error("cannot decode document text: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),

    #[error("invalid UTF-8 in document: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("namespace prefix {prefix} is not bound (in {name})")]
    UnboundPrefix { prefix: String, name: String },

    #[error("undeclared entity reference: &{name};")]
    UnknownEntity { name: String },

    #[error("element {name} is not closed")]
    UnclosedElement { name: String },

    #[error("document has no root element")]
    NoRootElement,
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PrettyXmlError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Transform result type alias
pub type TransformResult<T> = std::result::Result<T, TransformError>;

/// Document source result type alias
pub type SourceResult<T> = std::result::Result<T, SourceError>;
