//! # Kemline Protocol: Wire Format
//!
//! This crate implements the text wire format for the kemline KEM handshake
//! protocol.
//!
//! ## Protocol Design
//!
//! The protocol is a two-line exchange over a reliable byte stream:
//!
//! ```text
//! Server -> Client:  PK:<hex of public key>\n
//! Client -> Server:  CT:<hex of ciphertext>\n
//! ```
//!
//! Lines are newline-terminated; a carriage return before the terminator is
//! tolerated and stripped by the reader. All binary values travel as
//! lowercase hexadecimal.
//!
//! ## Implementation Notes
//!
//! - **Explicit Validation**: All parsing functions validate invariants and
//!   return `Result` types with structured errors. There are no "unchecked"
//!   fast paths and no panics on network input.
//!
//! - **Size Limits**: Expected lengths are fixed by the KEM parameter set, so
//!   every decode states the exact byte count it will accept. Anything else
//!   is a [`ProtocolError::LengthMismatch`], rejected before allocation of
//!   the full output.
//!
//! - **Case Handling**: Decoding accepts upper- and lowercase hex digits;
//!   encoding always produces lowercase.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod hex;
pub mod line;

pub use errors::{ProtocolError, Result};
