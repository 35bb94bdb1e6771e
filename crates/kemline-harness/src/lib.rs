//! Deterministic simulation harness for kemline protocol testing.
//!
//! This crate provides Turmoil-based implementations of the `Environment`
//! and `Transport` traits, enabling deterministic, reproducible testing of
//! the kemline handshake under virtual time: read timeouts, the
//! inter-connection delay, and key generation all replay identically from
//! a seed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod sim_env;
pub mod sim_transport;

pub use sim_env::SimEnv;
pub use sim_transport::SimTransport;
