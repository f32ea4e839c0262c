use std::borrow::Cow;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use encoding_rs::Encoding;
use log::{debug, info};
use regex::Regex;
use tempfile::NamedTempFile;

use crate::error::{PrettyXmlError, Result};
use crate::http_client::{HttpClient, HttpClientConfig};
use crate::registry::Registry;
use crate::serializer::serialize;
use crate::source::{DocumentSource, XmlReaderSource};
use crate::transform::{TransformEngine, TransformPipeline, UnavailableEngine};
use crate::validator::{InputSource, Settings};

static DECLARED_ENCODING_REGEX: OnceLock<Regex> = OnceLock::new();

fn declared_encoding_regex() -> &'static Regex {
    DECLARED_ENCODING_REGEX.get_or_init(|| {
        Regex::new(r#"^\s*<\?xml[^>]*?\sencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#)
            .expect("Failed to compile XML declaration regex")
    })
}

/// How rendered text becomes bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputEncoding {
    Utf8,
    /// Big-endian; `bom` is set for the unqualified `UTF-16` label.
    Utf16Be { bom: bool },
    Utf16Le,
    Other(&'static Encoding),
}

impl OutputEncoding {
    fn for_label(label: &str) -> Result<Self> {
        match label.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "UTF-16" => Ok(Self::Utf16Be { bom: true }),
            "UTF-16BE" => Ok(Self::Utf16Be { bom: false }),
            "UTF-16LE" => Ok(Self::Utf16Le),
            _ => Encoding::for_label(label.as_bytes())
                .map(Self::Other)
                .ok_or_else(|| PrettyXmlError::UnsupportedEncoding {
                    encoding: label.to_string(),
                }),
        }
    }

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        match *self {
            Self::Utf8 => Cow::Borrowed(text.as_bytes()),
            Self::Utf16Be { bom } => {
                let mut bytes = Vec::with_capacity(text.len() * 2 + 2);
                if bom {
                    bytes.extend_from_slice(&[0xFE, 0xFF]);
                }
                bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                Cow::Owned(bytes)
            }
            Self::Utf16Le => Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Self::Other(encoding) => {
                let (bytes, _, _) = encoding.encode(text);
                bytes
            }
        }
    }
}

/// Decodes input bytes. UTF-8 first (a BOM selects UTF-16), then the
/// encoding named by the XML declaration, then windows-1252.
pub fn decode_input(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    if let Some(caps) = declared_encoding_regex().captures(&head)
        && let Some(encoding) = Encoding::for_label(caps[1].as_bytes())
    {
        debug!("Decoding input as {}", encoding.name());
        let (text, _, _) = encoding.decode(bytes);
        return text;
    }

    debug!("Decoding input as windows-1252");
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text
}

/// Reads, transforms, serializes and writes one document.
pub struct PrettyPrinter {
    registry: Arc<Registry>,
    engine: Arc<dyn TransformEngine>,
    source: Arc<dyn DocumentSource + Send + Sync>,
    http: HttpClientConfig,
}

impl PrettyPrinter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            engine: Arc::new(UnavailableEngine),
            source: Arc::new(XmlReaderSource),
            http: HttpClientConfig::default(),
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn TransformEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn DocumentSource + Send + Sync>) -> Self {
        self.source = source;
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http = config;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses, transforms and serializes `text` without touching the
    /// configured input or output.
    pub fn render_str(&self, settings: &Settings, text: &str) -> Result<String> {
        let document = self.source.read_document(text)?;
        let pipeline = TransformPipeline::new(&self.registry, self.engine.as_ref());
        let document = pipeline.apply(settings.transform.as_deref(), document)?;
        Ok(serialize(&document, &settings.format))
    }

    /// Runs the whole job. Nothing is written unless every step succeeds.
    pub fn execute(&self, settings: &Settings) -> Result<()> {
        let encoding = OutputEncoding::for_label(&settings.format.encoding)?;

        let bytes = self.read_input(&settings.input)?;
        let text = decode_input(&bytes);
        let rendered = self.render_str(settings, &text)?;
        let encoded = encoding.encode(&rendered);

        match &settings.output {
            Some(path) => {
                info!("Writing {}", path.display());
                write_atomically(path, &encoded)
            }
            None => {
                info!("Writing to stdout");
                let mut stdout = io::stdout().lock();
                stdout.write_all(&encoded)?;
                stdout.flush()?;
                Ok(())
            }
        }
    }

    fn read_input(&self, input: &InputSource) -> Result<Vec<u8>> {
        match input {
            InputSource::File(path) => {
                info!("Reading {}", path.display());
                Ok(fs::read(path)?)
            }
            InputSource::Url(url) => HttpClient::new(self.http.clone())?.fetch(url),
            InputSource::Stdin => {
                info!("Reading from stdin");
                let mut bytes = Vec::new();
                io::stdin().lock().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let output_error = |details: String| PrettyXmlError::OutputFile {
        path: path.to_path_buf(),
        details,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|e| output_error(e.to_string()))?;
    file.write_all(bytes)
        .map_err(|e| output_error(e.to_string()))?;
    file.persist(path)
        .map_err(|e| output_error(e.error.to_string()))?;
    Ok(())
}
