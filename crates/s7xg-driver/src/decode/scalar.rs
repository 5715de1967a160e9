//! Numeric and on/off reply decoding.
//!
//! Numbers are read the way C's `atoi`/`atof` read them: leading whitespace is
//! skipped, then the longest numeric prefix is taken and the rest ignored
//! (`"2.5s"` reads as 2.5). Integers that do not fit the target type saturate.

use tracing::warn;

use crate::error::{DriverError, Result};

/// Numeric shape a caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Unsigned,
    Float,
}

/// A decoded number, tagged with the shape it was read as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Unsigned(_) => ValueKind::Unsigned,
            Value::Float(_) => ValueKind::Float,
        }
    }

    fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Unsigned => Value::Unsigned(0),
            ValueKind::Float => Value::Float(0.0),
        }
    }
}

/// A Rust number type a reply can be decoded into.
pub trait Scalar: Copy {
    const KIND: ValueKind;

    fn from_value(value: Value) -> Self;
}

macro_rules! signed_scalar {
    ($($t:ty),+) => {$(
        impl Scalar for $t {
            const KIND: ValueKind = ValueKind::Integer;

            fn from_value(value: Value) -> Self {
                match value {
                    Value::Integer(v) => {
                        <$t>::try_from(v).unwrap_or(if v < 0 { <$t>::MIN } else { <$t>::MAX })
                    }
                    Value::Unsigned(v) => <$t>::try_from(v).unwrap_or(<$t>::MAX),
                    Value::Float(v) => v as $t,
                }
            }
        }
    )+};
}

macro_rules! unsigned_scalar {
    ($($t:ty),+) => {$(
        impl Scalar for $t {
            const KIND: ValueKind = ValueKind::Unsigned;

            fn from_value(value: Value) -> Self {
                match value {
                    Value::Unsigned(v) => <$t>::try_from(v).unwrap_or(<$t>::MAX),
                    Value::Integer(v) => {
                        <$t>::try_from(v).unwrap_or(if v < 0 { 0 } else { <$t>::MAX })
                    }
                    Value::Float(v) => v as $t,
                }
            }
        }
    )+};
}

signed_scalar!(i8, i16, i32, i64);
unsigned_scalar!(u8, u16, u32, u64);

impl Scalar for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Self {
        match value {
            Value::Float(v) => v as f32,
            Value::Integer(v) => v as f32,
            Value::Unsigned(v) => v as f32,
        }
    }
}

impl Scalar for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Self {
        match value {
            Value::Float(v) => v,
            Value::Integer(v) => v as f64,
            Value::Unsigned(v) => v as f64,
        }
    }
}

/// Read the numeric prefix of `text` as `kind`.
///
/// Returns the value and the number of bytes consumed, including skipped
/// leading whitespace. `None` when no digits lead the text.
pub fn parse_prefix(text: &str, kind: ValueKind) -> Option<(Value, usize)> {
    match kind {
        ValueKind::Integer => int_prefix(text).map(|(v, n)| (Value::Integer(v), n)),
        ValueKind::Unsigned => uint_prefix(text).map(|(v, n)| (Value::Unsigned(v), n)),
        ValueKind::Float => float_prefix(text).map(|(v, n)| (Value::Float(v), n)),
    }
}

/// Decode a scalar reply, yielding zero when the reply has no numeric prefix.
///
/// The zero is indistinguishable from a genuine zero reading; use
/// [`decode_scalar_strict`] where that matters.
pub fn decode_scalar<T: Scalar>(text: &str) -> T {
    match parse_prefix(text, T::KIND) {
        Some((value, _)) => T::from_value(value),
        None => {
            warn!(reply = text, "reply has no numeric prefix, reading it as zero");
            T::from_value(Value::zero(T::KIND))
        }
    }
}

/// Decode a scalar reply, failing when the reply has no numeric prefix.
pub fn decode_scalar_strict<T: Scalar>(text: &str, what: &'static str) -> Result<T> {
    parse_prefix(text, T::KIND)
        .map(|(value, _)| T::from_value(value))
        .ok_or_else(|| DriverError::Decode {
            what,
            expected: 1,
            found: 0,
            payload: text.to_string(),
        })
}

/// `"on"` is true; everything else, including `"off"` and garbage, is false.
pub fn decode_bool(text: &str) -> bool {
    text == "on"
}

fn skip_ws(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn sign(bytes: &[u8]) -> (bool, usize) {
    match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    }
}

fn int_prefix(text: &str) -> Option<(i64, usize)> {
    let start = skip_ws(text);
    let bytes = &text.as_bytes()[start..];
    let (negative, sign_len) = sign(bytes);
    let count = digits(&bytes[sign_len..]);
    if count == 0 {
        return None;
    }
    let value = bytes[sign_len..sign_len + count]
        .iter()
        .fold(0i64, |acc, d| {
            let d = i64::from(d - b'0');
            if negative {
                acc.saturating_mul(10).saturating_sub(d)
            } else {
                acc.saturating_mul(10).saturating_add(d)
            }
        });
    Some((value, start + sign_len + count))
}

fn uint_prefix(text: &str) -> Option<(u64, usize)> {
    let start = skip_ws(text);
    let bytes = &text.as_bytes()[start..];
    let (negative, sign_len) = sign(bytes);
    let count = digits(&bytes[sign_len..]);
    if count == 0 {
        return None;
    }
    let value = if negative {
        0
    } else {
        bytes[sign_len..sign_len + count]
            .iter()
            .fold(0u64, |acc, d| {
                acc.saturating_mul(10).saturating_add(u64::from(d - b'0'))
            })
    };
    Some((value, start + sign_len + count))
}

fn float_prefix(text: &str) -> Option<(f64, usize)> {
    let start = skip_ws(text);
    let bytes = &text.as_bytes()[start..];
    let (_, mut end) = sign(bytes);

    let int_digits = digits(&bytes[end..]);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let (_, exp_sign) = sign(&bytes[end + 1..]);
        let exp_digits = digits(&bytes[end + 1 + exp_sign..]);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    let literal = &text[start..start + end];
    literal.parse::<f64>().ok().map(|v| (v, start + end))
}
