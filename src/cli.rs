use std::path::PathBuf;

use clap::Parser;

use crate::properties::{Properties, keys};

/// Prettyprint XML
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prettyxml")]
#[command(about = "Prettyprint XML with configurable indentation, attribute layout and whitespace handling")]
#[command(version)]
#[command(after_help = "EXAMPLES:
    prettyxml -i in.xml -o out.xml
    prettyxml -p compact -u https://example.com/feed.xml
    prettyxml -n 4 -s -a < in.xml
    prettyxml -t sort-elements;strip-comments -i in.xml
    prettyxml -p my.properties --save-properties saved.properties")]
pub struct Cli {
    /// Sort attributes by name
    #[arg(short = 's', long = "sort-attributes")]
    pub sort_attributes: bool,

    /// Put each attribute on its own line
    #[arg(short = 'a', long = "indent-attributes")]
    pub indent_attributes: bool,

    /// Indentation width, 0 for none
    #[arg(short = 'n', long = "indent", value_name = "NO")]
    pub indent: Option<String>,

    /// Preset name or property file (.properties, .toml or .json)
    #[arg(short = 'p', long = "properties", value_name = "FILE|PRESET")]
    pub properties: Option<String>,

    /// Transforms to apply, separated by ';'
    #[arg(short = 't', long = "transform", value_name = "LIST")]
    pub transform: Option<String>,

    /// Input file (default: stdin)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Input URL
    #[arg(short = 'u', long = "url", value_name = "URL", conflicts_with = "input")]
    pub url: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Store the resulting format properties in FILE and exit
    #[arg(long = "save-properties", value_name = "FILE")]
    pub save_properties: Option<PathBuf>,

    /// List presets, transforms and well-known encodings
    #[arg(long = "list")]
    pub list: bool,

    /// Enable debug logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Properties set explicitly on the command line. Flags that are absent
    /// leave the corresponding key unset.
    pub fn overrides(&self) -> Properties {
        let mut properties = Properties::new();
        if self.sort_attributes {
            properties.set(keys::SORT_ATTRIBUTES, "true");
        }
        if self.indent_attributes {
            properties.set(keys::INDENT_ATTRIBUTES, "true");
        }
        if let Some(indent) = &self.indent {
            properties.set(keys::INDENT, indent.as_str());
        }
        if let Some(transform) = &self.transform {
            properties.set(keys::TRANSFORM, transform.as_str());
        }
        if let Some(input) = &self.input {
            properties.set(keys::INPUT, input.to_string_lossy());
        }
        if let Some(url) = &self.url {
            properties.set(keys::URL, url.as_str());
        }
        if let Some(output) = &self.output {
            properties.set(keys::OUTPUT, output.to_string_lossy());
        }
        properties
    }
}
