//! Protocol line construction and parsing.
//!
//! The handshake exchanges exactly two lines: the server's `PK:` line
//! carrying its public key and the client's `CT:` line carrying the
//! ciphertext. Both payloads are hex-encoded via [`crate::hex`].
//!
//! Line terminators are a transport concern: builders here return the line
//! body without `\n`, and parsers expect the terminator (and any `\r`) to
//! have been stripped already.

use crate::errors::{ProtocolError, Result};
use crate::hex;

/// Prefix of the server's public-key line.
pub const PK_PREFIX: &str = "PK:";

/// Prefix of the client's ciphertext line.
pub const CT_PREFIX: &str = "CT:";

/// Builds the server's `PK:<hex>` line for a public key.
pub fn public_key_line(public_key: &[u8]) -> String {
    format!("{PK_PREFIX}{}", hex::encode(public_key))
}

/// Builds the client's `CT:<hex>` line for a ciphertext.
pub fn ciphertext_line(ciphertext: &[u8]) -> String {
    format!("{CT_PREFIX}{}", hex::encode(ciphertext))
}

/// Parses a `PK:<hex>` line into exactly `pk_len` public-key bytes.
///
/// # Errors
///
/// [`ProtocolError::MissingPrefix`] without the `PK:` prefix, otherwise any
/// error from [`hex::decode`].
pub fn parse_public_key_line(line: &str, pk_len: usize) -> Result<Vec<u8>> {
    let Some(rest) = line.strip_prefix(PK_PREFIX) else {
        return Err(ProtocolError::MissingPrefix { expected: PK_PREFIX });
    };
    hex::decode(rest, pk_len)
}

/// Parses a `CT:<hex>` line into exactly `ct_len` ciphertext bytes.
///
/// A ciphertext of any other length is a protocol error, not a crypto
/// error: it is rejected here before the KEM ever sees it.
///
/// # Errors
///
/// [`ProtocolError::MissingPrefix`] without the `CT:` prefix, otherwise any
/// error from [`hex::decode`].
pub fn parse_ciphertext_line(line: &str, ct_len: usize) -> Result<Vec<u8>> {
    let Some(rest) = line.strip_prefix(CT_PREFIX) else {
        return Err(ProtocolError::MissingPrefix { expected: CT_PREFIX });
    };
    hex::decode(rest, ct_len)
}

/// Maximum length of a well-formed protocol line, in bytes.
///
/// Prefix plus the hex encoding of the larger of the two payloads. Readers
/// use this as a hard cap so an unterminated line is rejected early instead
/// of being bounded only by the read timeout.
pub fn max_line_len(pk_len: usize, ct_len: usize) -> usize {
    CT_PREFIX.len() + 2 * pk_len.max(ct_len)
}
