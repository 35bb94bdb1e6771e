//! Error types for the kemline protocol core.
//!
//! This module provides strongly-typed errors for each layer:
//! - KEM errors (keypair generation, encapsulation, decapsulation)
//! - Read errors (line framing, timeout, oversized input)
//! - Session errors (the handshake's abort reasons)
//!
//! We avoid `std::io::Error` in protocol logic to keep errors comparable
//! in tests; transport failures are carried as strings at the boundary.

use std::time::Duration;

use kemline_proto::ProtocolError;
use thiserror::Error;

use crate::session::SessionState;

/// Errors from KEM capability operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KemError {
    /// Public key bytes have the wrong length or do not parse as a key
    #[error("invalid public key ({0} bytes)")]
    InvalidPublicKey(usize),

    /// Ciphertext bytes have the wrong length for this parameter set
    #[error("invalid ciphertext ({0} bytes)")]
    InvalidCiphertext(usize),

    /// Secret key bytes have the wrong length for this parameter set
    #[error("invalid secret key ({0} bytes)")]
    InvalidSecretKey(usize),

    /// The backend primitive reported a failure
    #[error("kem backend failure: {0}")]
    Backend(&'static str),
}

/// Errors from the framed line reader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// No line terminator arrived within the timeout
    #[error("timed out after {elapsed:?} waiting for line terminator")]
    Timeout {
        /// How long we waited
        elapsed: Duration,
    },

    /// The line exceeded the protocol's maximum line length
    #[error("line exceeds {max} bytes without terminator")]
    OversizedLine {
        /// Accumulated length when the cap was hit
        len: usize,
        /// The enforced maximum
        max: usize,
    },

    /// The stream ended before a line terminator
    #[error("connection closed before line terminator")]
    Closed,

    /// Underlying transport error
    #[error("transport error: {0}")]
    Transport(String),
}

/// Abort reasons for a handshake session.
///
/// Every variant maps to exactly one terminal `Aborted` outcome; the
/// session never retries and the server loop closes the connection
/// regardless of which one occurred.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Keypair generation failed at session start
    #[error("keypair generation failed: {0}")]
    Keypair(KemError),

    /// Writing the public-key line to the peer failed
    #[error("failed to write line: {0}")]
    Write(String),

    /// Reading the ciphertext line failed (timeout, oversize, close)
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The peer's line did not carry the ciphertext prefix
    #[error("malformed message: expected CT: line, got {got:?}")]
    MalformedMessage {
        /// Truncated preview of what the peer sent
        got: String,
    },

    /// The ciphertext hex failed to decode to exactly `CT_LEN` bytes
    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(ProtocolError),

    /// Decapsulation of a well-formed ciphertext failed
    #[error("decapsulation failed: {0}")]
    Decapsulation(KemError),

    /// Invalid state transition attempted
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred
        state: SessionState,
        /// Operation that was attempted
        operation: &'static str,
    },
}

impl SessionError {
    /// Returns true if this abort was caused by peer behavior on the wire
    /// (as opposed to a local crypto or transport failure).
    ///
    /// Protocol violations indicate a broken or malicious peer; they are
    /// never transient and never retried.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            SessionError::Read(ReadError::Timeout { .. })
                | SessionError::Read(ReadError::OversizedLine { .. })
                | SessionError::MalformedMessage { .. }
                | SessionError::MalformedCiphertext(_)
        )
    }
}
