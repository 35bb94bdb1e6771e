//! Handshake session state machine.
//!
//! One session per accepted connection: generate a fresh keypair, send the
//! public key, receive a ciphertext, derive the shared secret.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods accept the KEM capability and environment as parameters
//! - Methods return actions ([`SessionAction::SendLine`]) or the derived
//!   secret; driver code performs the actual I/O
//! - Driver-detected failures (write error, read timeout) are reported
//!   back via [`HandshakeSession::abort`]
//!
//! # State Machine
//!
//! ```text
//! ┌───────┐ keypair ┌──────────────────┐ line out ┌───────────────┐
//! │ Start │────────>│ KeypairGenerated │─────────>│ PublicKeySent │
//! └───────┘         └──────────────────┘          └───────────────┘
//!                                                        │ CT line
//!                                                        ↓
//!                     ┌───────────────┐  decap  ┌────────────────────┐
//!                     │ SecretDerived │<────────│ CiphertextReceived │
//!                     └───────────────┘         └────────────────────┘
//!
//! Aborted is terminal and reachable from every non-terminal state.
//! ```
//!
//! The session never retries a step: one connection attempt yields exactly
//! one handshake attempt, and the server loop closes the connection
//! whichever terminal state is reached.

use kemline_proto::{line, ProtocolError};

use crate::env::Environment;
use crate::error::SessionError;
use crate::kem::{Kem, KeyPair, SharedSecret};

/// How much of a malformed peer line is kept for diagnostics.
const MALFORMED_PREVIEW_LEN: usize = 32;

/// Actions returned by the session state machine.
///
/// The driver (server loop or test harness) executes these actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Write this line to the peer, followed by a newline terminator.
    SendLine(String),
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created, no KEM operation performed yet
    Start,
    /// Fresh keypair generated for this connection
    KeypairGenerated,
    /// Public-key line handed to the driver for sending
    PublicKeySent,
    /// Well-formed ciphertext received and decoded
    CiphertextReceived,
    /// Shared secret derived (terminal success)
    SecretDerived,
    /// Session aborted (terminal failure)
    Aborted,
}

/// Handshake session state machine for a single connection.
///
/// Holds the connection's keypair between sending the public key and
/// decapsulating the ciphertext. The secret key is dropped (and zeroized)
/// as soon as the secret is derived or the session aborts, on every path.
#[derive(Debug)]
pub struct HandshakeSession {
    state: SessionState,
    keypair: Option<KeyPair>,
}

impl Default for HandshakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl HandshakeSession {
    /// Creates a session in [`SessionState::Start`].
    pub fn new() -> Self {
        Self { state: SessionState::Start, keypair: None }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Begins the handshake: generates a fresh keypair and produces the
    /// `PK:<hex>` line for the driver to send.
    ///
    /// Transitions `Start → KeypairGenerated → PublicKeySent`. If the
    /// driver fails to write the line it must call [`Self::abort`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] if not in `Start`
    /// - [`SessionError::Keypair`] if keypair generation fails (session
    ///   aborts)
    pub fn start<K: Kem>(
        &mut self,
        kem: &K,
        env: &impl Environment,
    ) -> Result<Vec<SessionAction>, SessionError> {
        if self.state() != SessionState::Start {
            return Err(SessionError::InvalidState { state: self.state(), operation: "start" });
        }

        let keypair = match kem.keypair(env) {
            Ok(kp) => kp,
            Err(e) => {
                self.abort();
                return Err(SessionError::Keypair(e));
            },
        };
        self.state = SessionState::KeypairGenerated;

        let pk_line = line::public_key_line(&keypair.public);
        self.keypair = Some(keypair);
        self.state = SessionState::PublicKeySent;

        Ok(vec![SessionAction::SendLine(pk_line)])
    }

    /// Processes the peer's ciphertext line and derives the shared secret.
    ///
    /// Transitions `PublicKeySent → CiphertextReceived → SecretDerived` on
    /// success. Every failure aborts the session; there is no retry.
    ///
    /// # Errors
    ///
    /// - [`SessionError::InvalidState`] if not in `PublicKeySent`
    /// - [`SessionError::MalformedMessage`] without the `CT:` prefix
    /// - [`SessionError::MalformedCiphertext`] if the hex does not decode
    ///   to exactly `K::CT_LEN` bytes
    /// - [`SessionError::Decapsulation`] if the KEM rejects the ciphertext
    pub fn handle_line<K: Kem>(
        &mut self,
        kem: &K,
        peer_line: &str,
    ) -> Result<SharedSecret, SessionError> {
        if self.state() != SessionState::PublicKeySent {
            return Err(SessionError::InvalidState {
                state: self.state(),
                operation: "handle_line",
            });
        }

        let ciphertext = match line::parse_ciphertext_line(peer_line, K::CT_LEN) {
            Ok(ct) => ct,
            Err(ProtocolError::MissingPrefix { .. }) => {
                self.abort();
                return Err(SessionError::MalformedMessage { got: truncate(peer_line) });
            },
            Err(e) => {
                self.abort();
                return Err(SessionError::MalformedCiphertext(e));
            },
        };
        self.state = SessionState::CiphertextReceived;

        let Some(keypair) = self.keypair.take() else {
            // PublicKeySent without a keypair cannot happen via the public API
            self.abort();
            return Err(SessionError::InvalidState {
                state: SessionState::PublicKeySent,
                operation: "decapsulate without keypair",
            });
        };

        let secret = match kem.decapsulate(&ciphertext, &keypair.secret) {
            Ok(ss) => ss,
            Err(e) => {
                self.abort();
                return Err(SessionError::Decapsulation(e));
            },
        };
        // keypair (and its secret key) dropped and zeroized here
        drop(keypair);

        self.state = SessionState::SecretDerived;
        Ok(secret)
    }

    /// Aborts the session, dropping the keypair.
    ///
    /// Used by the driver for failures the state machine cannot observe
    /// itself: write failures and read timeouts. Idempotent; also reachable
    /// from every non-terminal state.
    pub fn abort(&mut self) {
        self.keypair = None;
        self.state = SessionState::Aborted;
    }
}

fn truncate(peer_line: &str) -> String {
    peer_line.chars().take(MALFORMED_PREVIEW_LEN).collect()
}
