//! Search key escaping
//!
//! The generator stores keys lowercased, with every ASCII character other
//! than `[a-z0-9]` written as `_` followed by two lowercase hex digits
//! (`.` is `_2e`, `_` is `_5f`, space is `_20`). Non-ASCII characters are
//! stored verbatim.

/// Encode free text the way the generator encodes keys.
///
/// Used to turn what a user types (`Array2D.hpp`) into something that can be
/// matched against stored keys (`array2d_2ehpp`).
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || !c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("_{:02x}", c as u32));
        }
    }
    out
}

/// Decode a stored key back to the symbol text it was built from.
///
/// Escapes are decoded byte-wise and the result is reassembled as UTF-8;
/// invalid sequences are replaced rather than rejected. A `_` that is not
/// followed by two lowercase hex digits is kept as is.
pub fn decode(key: &str) -> String {
    let bytes = key.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'_' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
