//! Cache Value Module
//!
//! The scalar types the cache accepts, their stored encoding and the text
//! form recorded in call history.

use std::fmt::Write as _;

// == Cache Value ==
/// A value accepted by [`Cache::store`](crate::cache::Cache::store).
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
}

impl CacheValue {
    /// Encodes the value the way the store client writes it.
    ///
    /// Numbers are written as their decimal text so they can be read back
    /// with `get_int` or incremented by the store.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            CacheValue::Text(text) => text.as_bytes().to_vec(),
            CacheValue::Bytes(bytes) => bytes.clone(),
            CacheValue::Int(n) => n.to_string().into_bytes(),
            CacheValue::Float(x) => float_repr(*x).into_bytes(),
        }
    }

    /// Text form of the value as it appears in the history log.
    pub fn repr(&self) -> String {
        match self {
            CacheValue::Text(text) => quote(text.chars(), ""),
            CacheValue::Bytes(bytes) => quote(bytes.iter().map(|&b| b as char), "b"),
            CacheValue::Int(n) => n.to_string(),
            CacheValue::Float(x) => float_repr(*x),
        }
    }

    /// Text form of the one-element argument tuple, e.g. `('hello',)`.
    pub fn repr_args(&self) -> String {
        format!("({},)", self.repr())
    }
}

impl From<String> for CacheValue {
    fn from(value: String) -> Self {
        CacheValue::Text(value)
    }
}

impl From<&str> for CacheValue {
    fn from(value: &str) -> Self {
        CacheValue::Text(value.to_string())
    }
}

impl From<Vec<u8>> for CacheValue {
    fn from(value: Vec<u8>) -> Self {
        CacheValue::Bytes(value)
    }
}

impl From<&[u8]> for CacheValue {
    fn from(value: &[u8]) -> Self {
        CacheValue::Bytes(value.to_vec())
    }
}

impl From<i64> for CacheValue {
    fn from(value: i64) -> Self {
        CacheValue::Int(value)
    }
}

impl From<i32> for CacheValue {
    fn from(value: i32) -> Self {
        CacheValue::Int(value.into())
    }
}

impl From<f64> for CacheValue {
    fn from(value: f64) -> Self {
        CacheValue::Float(value)
    }
}

/// Shortest round-trip text for a float, always showing a fraction or exponent.
///
/// Exponents carry an explicit sign and at least two digits (`1e+16`,
/// `1e-05`), matching what the store client writes.
fn float_repr(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let text = format!("{:?}", x);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Characters the history repr writes as-is; everything else is escaped.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    // Format characters: soft hyphen, zero-width and bidi marks, BOM
    !matches!(
        c as u32,
        0x00ad | 0x0600..=0x0605 | 0x061c | 0x06dd | 0x070f | 0x180e
            | 0x200b..=0x200f | 0x202a..=0x202e | 0x2060..=0x2064 | 0x2066..=0x206f
            | 0xd800..=0xdfff | 0xe000..=0xf8ff | 0xfeff | 0xfff9..=0xfffb
            | 0xf0000..=0x10ffff
    )
}

/// Quotes a character sequence with single quotes, or double quotes when
/// the text holds a single quote and no double quote.
fn quote(chars: impl Iterator<Item = char> + Clone, prefix: &str) -> String {
    let has_single = chars.clone().any(|c| c == '\'');
    let has_double = chars.clone().any(|c| c == '"');
    let delim = if has_single && !has_double { '"' } else { '\'' };
    let bytes_mode = !prefix.is_empty();

    let mut out = String::from(prefix);
    out.push(delim);
    for c in chars {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if bytes_mode && !(' '..='~').contains(&c) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if is_printable(c) => out.push(c),
            c if (c as u32) <= 0xff => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c if (c as u32) <= 0xffff => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => {
                let _ = write!(out, "\\U{:08x}", c as u32);
            }
        }
    }
    out.push(delim);
    out
}
