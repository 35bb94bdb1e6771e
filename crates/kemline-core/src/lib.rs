//! Kemline protocol core logic
//!
//! This crate contains the protocol logic for the kemline KEM handshake
//! server: a minimal key-encapsulation handshake exposed over a
//! line-oriented byte stream, plus a one-shot self-test that validates the
//! KEM primitive before the server starts serving clients.
//!
//! # Architecture
//!
//! Protocol logic is separated from transport and platform concerns:
//!
//! ```text
//!      ┌────────────────────────────┐
//!      │ kemline-core               │
//!      │ - Handshake state machine  │
//!      │ - KEM capability + backend │
//!      │ - Self-test routine        │
//!      │ - Server loop driver       │
//!      └────────────────────────────┘
//!         ↓                      ↓
//! ┌────────────────┐  ┌────────────────┐
//! │ kemline-harness│  │ kemline-server │
//! │ (Turmoil)      │  │ (Tokio)        │
//! │ - Virtual time │  │ - Real network │
//! │ - Seeded RNG   │  │ - OS entropy   │
//! │ - Sim TCP      │  │ - Production   │
//! └────────────────┘  └────────────────┘
//! ```
//!
//! # Key Principles
//!
//! - Entropy through the seam: key material is derived from
//!   [`env::Environment::random_bytes`], never from ambient RNG state, so
//!   simulation runs are reproducible from a seed
//! - Byte streams through the seam: the server loop accepts streams from a
//!   [`transport::Transport`], so the same loop runs over real and
//!   simulated TCP
//! - One handshake at a time: the server loop is strictly sequential by
//!   design; a second client is not accepted until the current session
//!   reaches a terminal state and the connection is closed
//!
//! # Modules
//!
//! - [`kem`]: KEM capability trait, key/secret types, ML-KEM-768 backend
//! - [`session`]: Handshake session state machine (action pattern)
//! - [`selftest`]: Startup KEM self-test routine
//! - [`reader`]: Framed line reader (timeout + length cap)
//! - [`server`]: Accept loop and per-connection driver
//! - [`env`]: Environment abstraction (sleep, entropy)
//! - [`transport`]: Transport abstraction (streams)
//! - [`error`]: Error types for all layers

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod kem;
pub mod reader;
pub mod selftest;
pub mod server;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;
