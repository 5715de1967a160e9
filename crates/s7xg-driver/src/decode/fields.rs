use crate::decode::scalar::{parse_prefix, Scalar, Value};
use crate::error::{DriverError, Result};

/// Pattern scanner over a reply payload.
///
/// Follows `scanf` matching rules: whitespace in a literal matches any run
/// of whitespace in the input (including none), other literal characters
/// must match exactly, and each numeric conversion skips leading whitespace
/// before reading its prefix. Every successful conversion is counted, so a
/// short scan reports how far it got.
#[derive(Debug)]
pub struct FieldScanner<'a> {
    rest: &'a str,
    converted: usize,
}

impl<'a> FieldScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            converted: 0,
        }
    }

    /// Match `pattern` literally. Returns `None` on the first mismatch.
    pub fn literal(&mut self, pattern: &str) -> Option<()> {
        let mut rest = self.rest;
        for expected in pattern.chars() {
            if expected.is_whitespace() {
                rest = rest.trim_start();
                continue;
            }
            rest = rest.strip_prefix(expected)?;
        }
        self.rest = rest;
        Some(())
    }

    /// Convert the next field.
    pub fn field<T: Scalar>(&mut self) -> Option<T> {
        let (value, consumed) = parse_prefix(self.rest, T::KIND)?;
        self.rest = &self.rest[consumed..];
        self.converted += 1;
        Some(T::from_value(value))
    }

    /// Read the next whitespace-delimited word.
    pub fn word(&mut self) -> Option<&'a str> {
        let trimmed = self.rest.trim_start();
        let end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        if end == 0 {
            return None;
        }
        let (word, rest) = trimmed.split_at(end);
        self.rest = rest;
        self.converted += 1;
        Some(word)
    }

    /// Number of successful conversions so far.
    pub fn converted(&self) -> usize {
        self.converted
    }

    /// Unscanned remainder.
    pub fn rest(&self) -> &'a str {
        self.rest
    }
}

/// Scan `N` whitespace-separated numbers of one type.
pub fn scan_fields<T: Scalar, const N: usize>(text: &str, what: &'static str) -> Result<[T; N]> {
    let mut scanner = FieldScanner::new(text);
    let mut out = [T::from_value(Value::Unsigned(0)); N];
    for slot in out.iter_mut() {
        match scanner.field::<T>() {
            Some(value) => *slot = value,
            None => return Err(short_scan(what, N, scanner.converted(), text)),
        }
    }
    Ok(out)
}

pub(crate) fn short_scan(
    what: &'static str,
    expected: usize,
    found: usize,
    payload: &str,
) -> DriverError {
    DriverError::Decode {
        what,
        expected,
        found,
        payload: payload.to_string(),
    }
}
