//! HTML character reference decoding for labels and scope strings
//!
//! Labels are emitted already HTML-escaped (`Array2D&lt; T &gt;`,
//! `ArrayToVector(T *a, int size):&#160;streampower.h`). Only the references
//! the generator actually produces are named here; numeric references are
//! decoded generally. Anything unrecognised is left untouched.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

static CHAR_REF: OnceLock<Regex> = OnceLock::new();

fn char_ref() -> &'static Regex {
    CHAR_REF.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|([A-Za-z]+));")
            .expect("character reference pattern is valid")
    })
}

/// Decode HTML character references in `text`.
///
/// Returns the input borrowed when it contains no `&`.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    char_ref().replace_all(text, |caps: &Captures<'_>| {
        let decoded = if let Some(dec) = caps.get(1) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else if let Some(hex) = caps.get(2) {
            u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
        } else {
            caps.get(3).and_then(|name| named(name.as_str()))
        };

        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}

fn named(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_borrowed() {
        assert!(matches!(decode_entities("Avalanche::Avalanche()"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_named_references() {
        assert_eq!(decode_entities("AccumulateTimer&lt; T &gt;"), "AccumulateTimer< T >");
        assert_eq!(
            decode_entities("Array2D::Array2D(int width, int height, const T &amp;val=T())"),
            "Array2D::Array2D(int width, int height, const T &val=T())"
        );
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(
            decode_entities("ArrayToVector(T *a, int size):&#160;streampower.h"),
            "ArrayToVector(T *a, int size):\u{a0}streampower.h"
        );
        assert_eq!(decode_entities("&#x3C;&#X3e;"), "<>");
    }

    #[test]
    fn test_unknown_references_kept() {
        assert_eq!(decode_entities("a &bogus; b"), "a &bogus; b");
        assert_eq!(decode_entities("&#1114112;"), "&#1114112;");
        assert_eq!(decode_entities("a & b"), "a & b");
    }
}
