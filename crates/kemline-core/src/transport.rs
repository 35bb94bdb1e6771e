//! Transport abstraction for network I/O.
//!
//! The `Transport` trait abstracts over reliable, bidirectional byte
//! streams with accept/connect semantics. This allows the same server loop
//! to run over:
//!
//! - **Real TCP** (production via Tokio)
//! - **Simulated TCP** (testing via Turmoil)
//!
//! Link bring-up and socket binding are the implementation's concern; the
//! core consumes an already-bound endpoint and only ever asks it for the
//! next connection.
//!
//! # What We ARE Testing Through This Seam
//!
//! - Handshake state machine correctness over a real byte stream
//! - Line framing, timeouts, and oversized-input rejection
//! - Strict one-at-a-time connection serialization

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Abstract transport for reliable, ordered byte streams.
///
/// A connection is represented as a pair of stream halves, `(send, recv)`.
/// Dropping both halves closes the connection; the server loop relies on
/// this to close every connection unconditionally after a handshake
/// reaches a terminal state.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Type of stream for sending data.
    type SendStream: AsyncWrite + Unpin + Send + 'static;

    /// Type of stream for receiving data.
    type RecvStream: AsyncRead + Unpin + Send + 'static;

    /// Accepts an incoming connection, returning send/receive halves.
    ///
    /// Awaits until a connection is available. Awaiting here is the
    /// accept-poll's cooperative yield: no connection pending means the
    /// task is parked, not spinning.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the endpoint is shut down or the
    /// connection fails while being established.
    async fn accept(&self) -> io::Result<(Self::SendStream, Self::RecvStream)>;

    /// Connects to a remote endpoint, returning send/receive halves.
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if the remote endpoint is unreachable or
    /// refuses the connection.
    async fn connect(
        &self,
        remote_endpoint: SocketAddr,
    ) -> io::Result<(Self::SendStream, Self::RecvStream)>;
}
