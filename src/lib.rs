//! # prettyxml Library
//!
//! Prettyprints XML documents: a validated [`Format`] drives a single
//! serializer that controls indentation, attribute layout, whitespace
//! handling, line separators and namespace declarations. Property files,
//! presets and environment overrides are merged into that format by
//! [`ConfigManager`]; [`PrettyPrinter`] ties reading, transforming and
//! writing together.

pub mod cli;
pub mod config;
pub mod error;
pub mod escape;
pub mod format;
pub mod http_client;
pub mod namespace;
pub mod properties;
pub mod registry;
pub mod runner;
pub mod serializer;
pub mod source;
pub mod transform;
pub mod tree;
pub mod validator;

pub use cli::Cli;
pub use config::{ConfigManager, EnvProvider, SystemEnvProvider};
pub use error::{ConfigError, PrettyXmlError, Result, SourceError, TransformError};
pub use escape::EscapeStrategy;
pub use format::{Format, Indent, LineSeparator, TextMode};
pub use http_client::{HttpClient, HttpClientConfig};
pub use namespace::{Namespace, NamespaceScope};
pub use properties::Properties;
pub use registry::Registry;
pub use runner::PrettyPrinter;
pub use serializer::{XmlSerializer, serialize, serialize_to};
pub use source::{DocumentSource, XmlReaderSource, parse_str};
pub use transform::{Tier, Transform, TransformEngine, TransformPipeline, UnavailableEngine};
pub use tree::{Attribute, DocType, Document, Element, Node, ProcessingInstruction};
pub use validator::{InputSource, Settings, UnknownKeys, ValidationOptions, build_format, validate};
