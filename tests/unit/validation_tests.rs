use prettyxml::validator::check_properties;
use prettyxml::{
    ConfigError, InputSource, TextMode, UnknownKeys, ValidationOptions, build_format, validate,
};

use crate::common::test_helpers::{properties, settings};

#[test]
fn test_every_text_mode_name_is_accepted() {
    for mode in TextMode::ALL {
        let settings = settings(&[("textMode", mode.as_str())]);
        assert_eq!(settings.format.text_mode, mode);
    }
    assert_eq!("TRIM_FULL_WHITE".parse::<TextMode>().unwrap(), TextMode::TrimFullWhite);
}

#[test]
fn test_text_mode_is_case_sensitive() {
    let result = validate(&properties(&[("textMode", "trim")]), ValidationOptions::strict());
    assert!(matches!(result, Err(ConfigError::InvalidTextMode { .. })));
}

#[test]
fn test_indent_boundaries() {
    let zero = check_properties(&properties(&[("indent", "0")]), ValidationOptions::strict())
        .unwrap();
    assert!(!zero.contains_key("indent"));

    let max = settings(&[("indent", "99")]);
    assert_eq!(max.format.indent.map(|i| i.as_str().len()), Some(99));

    for bad in ["100", "-1", "two", ""] {
        let result = validate(&properties(&[("indent", bad)]), ValidationOptions::strict());
        assert!(
            matches!(result, Err(ConfigError::InvalidIndent { .. })),
            "indent {:?} should be rejected",
            bad
        );
    }
}

#[test]
fn test_input_url_exclusivity() {
    let both = validate(
        &properties(&[("input", "aaa"), ("url", "bbb")]),
        ValidationOptions::strict(),
    );
    assert!(matches!(both, Err(ConfigError::MutuallyExclusive { .. })));

    assert_eq!(
        settings(&[("input", "aaa")]).input,
        InputSource::File("aaa".into())
    );
    assert_eq!(
        settings(&[("url", "bbb")]).input,
        InputSource::Url("bbb".to_string())
    );
    assert_eq!(settings(&[]).input, InputSource::Stdin);
}

#[test]
fn test_lenient_non_extended_mode() {
    let options = ValidationOptions {
        unknown_keys: UnknownKeys::Drop,
        extended: false,
    };
    let checked = check_properties(
        &properties(&[("input", "aaa"), ("url", "bbb"), ("x", "y"), ("indent", "2")]),
        options,
    )
    .unwrap();

    assert_eq!(checked.len(), 1);
    assert_eq!(checked.get("indent"), Some("2"));
}

#[test]
fn test_build_format_matches_attribute_example() {
    let checked = check_properties(
        &properties(&[
            ("indent", "2"),
            ("sortAttributes", "true"),
            ("indentAttributes", "True"),
        ]),
        ValidationOptions::strict(),
    )
    .unwrap();
    let format = build_format(&checked).unwrap();

    assert!(format.sort_attributes);
    assert!(format.indent_attributes);
    assert_eq!(format.indent.map(|i| i.width()), Some(2));
}

#[test]
fn test_settings_keep_normalized_properties() {
    let settings = settings(&[
        ("omitEncoding", "FALSE"),
        ("transform", "  strip-comments  "),
        ("output", "   "),
    ]);
    assert_eq!(settings.properties.get("omitEncoding"), Some("false"));
    assert_eq!(settings.transform.as_deref(), Some("strip-comments"));
    assert_eq!(settings.output, None);
}
