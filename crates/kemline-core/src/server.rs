//! Server loop: strictly sequential accept-and-handshake driver.
//!
//! The loop accepts one connection at a time, drives a single
//! [`HandshakeSession`](crate::session::HandshakeSession) to a terminal
//! state, closes the connection unconditionally, waits a fixed
//! inter-connection delay, and repeats. This is a stated capacity limit,
//! not an accident: there is no worker pool and no per-connection
//! concurrency, suitable only for a single expected client at a time.
//!
//! A session failure never crashes the loop; it is logged and the loop
//! continues accepting. The loop itself never terminates.

use std::io;
use std::time::Duration;

use kemline_proto::{hex, line};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::env::Environment;
use crate::error::SessionError;
use crate::kem::{Kem, SharedSecret};
use crate::reader::read_line;
use crate::session::{HandshakeSession, SessionAction};
use crate::transport::Transport;

/// Bytes of the derived secret shown in the success log line.
const PREVIEW_BYTES: usize = 8;

/// Server loop configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Timeout for reading the client's ciphertext line
    pub read_timeout: Duration,
    /// Fixed delay between connections (bounds minimum turnaround)
    pub accept_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(10_000),
            accept_delay: Duration::from_millis(5_000),
        }
    }
}

/// Drives one handshake session over an accepted connection.
///
/// Executes the session's actions (writing the `PK:` line), reads the
/// peer's ciphertext line with the configured timeout and the protocol's
/// line-length cap, and returns the derived shared secret. The caller
/// closes the connection afterwards regardless of the outcome.
///
/// # Errors
///
/// Returns the session's abort reason; see
/// [`SessionError`] for the taxonomy. Errors are local to this connection.
pub async fn handle_connection<K, E, S, R>(
    send: &mut S,
    recv: &mut R,
    kem: &K,
    env: &E,
    config: &ServerConfig,
) -> Result<SharedSecret, SessionError>
where
    K: Kem,
    E: Environment,
    S: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let mut session = HandshakeSession::new();

    for action in session.start(kem, env)? {
        match action {
            SessionAction::SendLine(out) => {
                if let Err(e) = write_line(send, &out).await {
                    session.abort();
                    return Err(SessionError::Write(e.to_string()));
                }
            },
        }
    }

    let max_len = line::max_line_len(K::PK_LEN, K::CT_LEN);
    let peer_line = match read_line(recv, config.read_timeout, max_len).await {
        Ok(l) => l,
        Err(e) => {
            session.abort();
            return Err(e.into());
        },
    };

    session.handle_line(kem, &peer_line)
}

/// Runs the accept loop forever.
///
/// Strictly sequential: while one handshake is in progress no further
/// connection is accepted. Each connection is closed unconditionally when
/// its session reaches a terminal state, then the loop sleeps
/// `accept_delay` before accepting again. Accept failures are logged and
/// the loop continues after the same delay.
///
/// This function never returns; the `Result` in the signature only lets
/// the loop double as a simulation host closure.
pub async fn serve<T, K, E>(
    transport: &T,
    kem: &K,
    env: &E,
    config: &ServerConfig,
) -> io::Result<()>
where
    T: Transport,
    K: Kem,
    E: Environment,
{
    loop {
        let (mut send, mut recv) = match transport.accept().await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                env.sleep(config.accept_delay).await;
                continue;
            },
        };
        tracing::info!("client connected, starting handshake");

        match handle_connection(&mut send, &mut recv, kem, env, config).await {
            Ok(secret) => {
                tracing::info!(
                    shared_secret = %hex::preview(secret.as_bytes(), PREVIEW_BYTES),
                    "handshake complete"
                );
            },
            Err(e) => {
                tracing::warn!(error = %e, protocol_violation = e.is_protocol_violation(),
                    "handshake aborted");
            },
        }

        // Close unconditionally, success or abort
        drop(send);
        drop(recv);

        env.sleep(config.accept_delay).await;
    }
}

async fn write_line<S: AsyncWrite + Unpin>(send: &mut S, out: &str) -> io::Result<()> {
    send.write_all(out.as_bytes()).await?;
    send.write_all(b"\n").await?;
    send.flush().await
}
