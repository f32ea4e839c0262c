//! Escaping of attribute values and character data.
//!
//! Besides markup characters, anything the target encoding cannot represent
//! is written as a hexadecimal character reference.

use std::borrow::Cow;

use encoding_rs::Encoding;

/// Decides which characters the output encoding can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStrategy {
    /// UTF-8 and UTF-16: every character is representable.
    Unicode,
    /// ISO-8859-1: up to U+00FF.
    Latin1,
    /// US-ASCII, and labels nothing else recognizes: up to U+007F.
    Ascii,
    /// Any other label known to `encoding_rs`.
    Encoding(&'static Encoding),
}

impl EscapeStrategy {
    pub fn for_encoding(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "utf-8" | "utf8" | "utf-16" | "utf-16be" | "utf-16le" | "utf16" => Self::Unicode,
            "iso-8859-1" | "iso8859-1" | "iso_8859-1" | "latin1" | "l1" => Self::Latin1,
            "us-ascii" | "ascii" => Self::Ascii,
            _ => match Encoding::for_label(normalized.as_bytes()) {
                Some(encoding) if encoding == encoding_rs::UTF_8 => Self::Unicode,
                Some(encoding) => Self::Encoding(encoding),
                None => Self::Ascii,
            },
        }
    }

    pub fn can_encode(&self, c: char) -> bool {
        match self {
            Self::Unicode => true,
            Self::Latin1 => (c as u32) <= 0xFF,
            Self::Ascii => (c as u32) <= 0x7F,
            Self::Encoding(encoding) => {
                if c.is_ascii() {
                    return true;
                }
                let mut buf = [0u8; 4];
                let (_, _, unmappable) = encoding.encode(c.encode_utf8(&mut buf));
                !unmappable
            }
        }
    }

    /// Escapes an attribute value: `&`, `<`, `>`, `"`, CR, LF and TAB.
    pub fn escape_attribute<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.escape_with(value, |c| match c {
            '&' => Some("&amp;"),
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            '"' => Some("&quot;"),
            '\r' => Some("&#xD;"),
            '\n' => Some("&#xA;"),
            '\t' => Some("&#x9;"),
            _ => None,
        })
    }

    /// Escapes character data: `&`, `<`, `>` and CR.
    pub fn escape_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.escape_with(text, |c| match c {
            '&' => Some("&amp;"),
            '<' => Some("&lt;"),
            '>' => Some("&gt;"),
            '\r' => Some("&#xD;"),
            _ => None,
        })
    }

    fn escape_with<'a>(
        &self,
        input: &'a str,
        markup: impl Fn(char) -> Option<&'static str>,
    ) -> Cow<'a, str> {
        let needs_escape = |c: char| markup(c).is_some() || !self.can_encode(c);
        let Some(first) = input.find(needs_escape) else {
            return Cow::Borrowed(input);
        };

        let mut out = String::with_capacity(input.len() + 16);
        out.push_str(&input[..first]);
        for c in input[first..].chars() {
            if let Some(entity) = markup(c) {
                out.push_str(entity);
            } else if self.can_encode(c) {
                out.push(c);
            } else {
                out.push_str(&format!("&#x{:x};", c as u32));
            }
        }
        Cow::Owned(out)
    }
}
