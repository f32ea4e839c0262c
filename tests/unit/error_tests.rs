use std::error::Error;
use std::io;

use prettyxml::{ConfigError, PrettyXmlError, SourceError, TransformError};

#[test]
fn test_config_errors_name_the_offending_value() {
    let cases = [
        (
            ConfigError::UnknownKey {
                key: "colour".to_string(),
            },
            "colour",
        ),
        (
            ConfigError::InvalidTextMode {
                value: "SQUASH".to_string(),
            },
            "SQUASH",
        ),
        (
            ConfigError::InvalidValue {
                key: "encoding".to_string(),
                value: " ".to_string(),
                reason: "must not be empty".to_string(),
            },
            "encoding",
        ),
        (
            ConfigError::UnknownPreset {
                name: "fancy".to_string(),
            },
            "fancy",
        ),
        (
            ConfigError::MalformedLine {
                line: 3,
                content: "oops".to_string(),
            },
            "oops",
        ),
        (ConfigError::UnsupportedFormat("yaml".to_string()), "yaml"),
    ];

    for (error, needle) in cases {
        assert!(
            error.to_string().contains(needle),
            "{} should mention {}",
            error,
            needle
        );
    }
}

#[test]
fn test_errors_convert_into_application_error() {
    let config: PrettyXmlError = ConfigError::InvalidIndent {
        value: "-1".to_string(),
    }
    .into();
    assert!(matches!(config, PrettyXmlError::Config(_)));
    assert!(config.to_string().starts_with("Configuration error:"));

    let transform: PrettyXmlError = TransformError::Compile {
        name: "x.xslt".to_string(),
        details: "bad".to_string(),
    }
    .into();
    assert!(matches!(transform, PrettyXmlError::Transform(_)));

    let source: PrettyXmlError = SourceError::NoRootElement.into();
    assert!(matches!(source, PrettyXmlError::Source(_)));

    let io: PrettyXmlError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, PrettyXmlError::Io(_)));
}

#[test]
fn test_transform_io_error_keeps_its_source() {
    let error = TransformError::Io {
        path: "style.xslt".into(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(error.to_string().contains("style.xslt"));
    assert!(error.source().is_some());
}

#[test]
fn test_http_status_error_display() {
    let error = PrettyXmlError::HttpStatus {
        url: "http://localhost/doc.xml".to_string(),
        status: 404,
        message: "HTTP 404: Not Found".to_string(),
    };
    let message = error.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("http://localhost/doc.xml"));
}

#[test]
fn test_source_error_display() {
    let unbound = SourceError::UnboundPrefix {
        prefix: "p".to_string(),
        name: "p:a".to_string(),
    };
    assert!(unbound.to_string().contains("p:a"));

    let entity = SourceError::UnknownEntity {
        name: "nbsp".to_string(),
    };
    assert_eq!(entity.to_string(), "undeclared entity reference: &nbsp;");
}
