//! Typed command builders.
//!
//! Each family module returns [`Command`] values. Arguments are checked here,
//! before anything reaches the link: a bad argument is an
//! [`InvalidArgument`](crate::DriverError::InvalidArgument) error and no bytes
//! are written. Text formatting happens once, when the command is built, and
//! the text is written verbatim with no line terminator added.

pub mod gps;
pub mod mac;
pub mod rf;
pub mod sip;

use std::fmt;

use crate::error::{DriverError, Result};

/// One command line for the module.
#[derive(Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    /// Carries key material and is redacted in debug output and logs.
    secret: bool,
}

impl Command {
    /// A command sent exactly as given.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            secret: false,
        }
    }

    pub(crate) fn secret(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            secret: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Bytes written to the link.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Whether the command carries key material.
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Text safe to log: secret commands keep only their verb.
    pub fn redacted(&self) -> String {
        if !self.secret {
            return self.text.clone();
        }
        let verb: Vec<&str> = self.text.split(' ').take(2).collect();
        format!("{} <redacted:{} bytes>", verb.join(" "), self.text.len())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Command::raw(text)
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Command::raw(text)
    }
}

pub(crate) fn check_range<T>(name: &str, value: T, range: std::ops::RangeInclusive<T>) -> Result<T>
where
    T: PartialOrd + fmt::Display + Copy,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(DriverError::InvalidArgument(format!(
            "{name} must be in {}..={}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Hex strings are passed through as typed; only digits are allowed.
pub(crate) fn check_hex(name: &str, value: &str, digits: Option<usize>) -> Result<()> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DriverError::InvalidArgument(format!(
            "{name} must be a non-empty hex string"
        )));
    }
    if let Some(expected) = digits {
        if value.len() != expected {
            return Err(DriverError::InvalidArgument(format!(
                "{name} must be {expected} hex digits, got {}",
                value.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_command_is_verbatim() {
        let cmd = Command::raw("sip get_ver");
        assert_eq!(cmd.as_bytes(), b"sip get_ver");
        assert_eq!(cmd.to_string(), "sip get_ver");
        assert!(!cmd.is_secret());
    }

    #[test]
    fn secret_command_is_redacted() {
        let cmd = Command::secret("mac set_appkey 000102030405060708090A0B0C0D0E0F");
        assert_eq!(cmd.to_string(), "mac set_appkey <redacted:47 bytes>");
        assert!(!format!("{cmd:?}").contains("0A0B"));
        assert!(cmd.text().ends_with("0E0F"));
    }

    #[test]
    fn range_check() {
        assert_eq!(check_range("port", 1u8, 1..=223).unwrap(), 1);
        let err = check_range("port", 224u8, 1..=223).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid argument: port must be in 1..=223, got 224"
        );
    }

    #[test]
    fn hex_check() {
        assert!(check_hex("payload", "00ff", None).is_ok());
        assert!(check_hex("payload", "", None).is_err());
        assert!(check_hex("payload", "0g", None).is_err());
        assert!(check_hex("deveui", "0011", Some(16)).is_err());
    }
}
