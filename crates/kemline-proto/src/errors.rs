//! Error types for the kemline wire format.
//!
//! All errors are structured, testable, and carry the position information
//! needed to diagnose a misbehaving peer from a log line alone.

use thiserror::Error;

/// Errors that can occur while encoding or parsing protocol lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Hex text does not have the expected number of characters
    #[error("hex length mismatch: expected {expected} characters, got {actual}")]
    LengthMismatch {
        /// Expected character count (always `2 * expected_len`)
        expected: usize,
        /// Actual character count received
        actual: usize,
    },

    /// A character outside `[0-9a-fA-F]` appeared in hex text
    #[error("invalid hex character {character:?} at position {position}")]
    InvalidCharacter {
        /// Byte offset of the offending character
        position: usize,
        /// The offending character
        character: char,
    },

    /// A protocol line does not start with the required prefix
    #[error("missing {expected:?} prefix")]
    MissingPrefix {
        /// The prefix that was required
        expected: &'static str,
    },
}

/// Convenient Result type alias for wire-format operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
