//! Hexadecimal codec for binary wire values.
//!
//! Every binary value in the protocol (public key, ciphertext) travels as
//! hex text, two characters per byte, high nibble first. Encoding is a total
//! function; decoding validates both length and alphabet up front.

use crate::errors::{ProtocolError, Result};

const TABLE: &[u8; 16] = b"0123456789abcdef";

/// Encodes bytes as lowercase hex, two characters per input byte.
///
/// The output length is always `2 * bytes.len()`. This is a total function:
/// there is no error path.
pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(TABLE[(b >> 4) as usize] as char);
        out.push(TABLE[(b & 0x0f) as usize] as char);
    }
    out
}

/// Decodes hex text into exactly `expected_len` bytes.
///
/// Accepts upper- and lowercase digits. Each byte is assembled from a
/// high-then-low nibble pair.
///
/// # Errors
///
/// - [`ProtocolError::LengthMismatch`] if `text` is not exactly
///   `2 * expected_len` characters
/// - [`ProtocolError::InvalidCharacter`] for the first character outside
///   `[0-9a-fA-F]`
pub fn decode(text: &str, expected_len: usize) -> Result<Vec<u8>> {
    let raw = text.as_bytes();
    if raw.len() != expected_len * 2 {
        return Err(ProtocolError::LengthMismatch {
            expected: expected_len * 2,
            actual: raw.len(),
        });
    }

    let mut out = Vec::with_capacity(expected_len);
    for i in 0..expected_len {
        let hi = nibble(raw, 2 * i)?;
        let lo = nibble(raw, 2 * i + 1)?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

/// Short hex preview of a byte sequence for diagnostic logging.
///
/// Returns the hex encoding of at most `max_bytes` leading bytes, with a
/// `..` suffix when the input was truncated. Intended for log lines that
/// must never carry full key or secret material.
pub fn preview(bytes: &[u8], max_bytes: usize) -> String {
    if bytes.len() <= max_bytes {
        encode(bytes)
    } else {
        format!("{}..", encode(&bytes[..max_bytes]))
    }
}

fn nibble(raw: &[u8], position: usize) -> Result<u8> {
    match raw[position] {
        b @ b'0'..=b'9' => Ok(b - b'0'),
        b @ b'a'..=b'f' => Ok(b - b'a' + 10),
        b @ b'A'..=b'F' => Ok(b - b'A' + 10),
        b => Err(ProtocolError::InvalidCharacter {
            position,
            character: b as char,
        }),
    }
}
