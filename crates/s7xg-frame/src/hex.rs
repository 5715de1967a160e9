//! ASCII-hex payload codec.
//!
//! The module carries radio payloads as hex text in both directions
//! (`rf tx <hex>`, `mac tx ... <hex>`, `radio_rx <hex> ...`). Encoding emits
//! uppercase digits with no separators. Decoding is lenient: anything that
//! is not a hex digit is skipped, and an odd digit count is padded with a
//! trailing zero nibble.

use crate::error::HexError;

/// Encode bytes as uppercase hex, two characters per byte.
pub fn encode_upper(bytes: &[u8]) -> String {
    ::hex::encode_upper(bytes)
}

/// Number of bytes `text` decodes to.
pub fn decoded_len(text: &str) -> usize {
    let digits = text.bytes().filter(u8::is_ascii_hexdigit).count();
    digits.div_ceil(2)
}

/// Decode `text` into `dst`, returning the number of bytes written.
///
/// Fails without touching `dst` when the result would not fit.
pub fn decode_into(text: &str, dst: &mut [u8]) -> Result<usize, HexError> {
    let needed = decoded_len(text);
    if needed > dst.len() {
        return Err(HexError::CapacityExceeded {
            needed,
            capacity: dst.len(),
        });
    }

    let mut digits: Vec<u8> = text.bytes().filter(u8::is_ascii_hexdigit).collect();
    if digits.len() % 2 == 1 {
        digits.push(b'0');
    }
    ::hex::decode_to_slice(&digits, &mut dst[..needed])?;
    Ok(needed)
}

/// Decode `text` into a freshly sized vector.
pub fn decode(text: &str) -> Vec<u8> {
    let mut out = vec![0u8; decoded_len(text)];
    // The vector is sized from the same digit count, so this cannot overflow.
    let written = decode_into(text, &mut out).unwrap_or(0);
    out.truncate(written);
    out
}
