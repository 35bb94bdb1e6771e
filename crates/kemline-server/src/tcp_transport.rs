//! Real TCP Transport implementation for production deployment.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use kemline_core::transport::Transport;
use tokio::io::{ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};

/// Production transport over Tokio TCP sockets.
///
/// Mirrors the simulation transport in `kemline-harness`: one
/// bidirectional stream per connection, split into send and receive
/// halves. The server loop only ever accepts; `connect` exists so the
/// same trait serves client-side tooling.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a listener on the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or already in use.
    pub async fn bind(address: SocketAddr) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener })
    }

    /// The locally bound address, useful when binding port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl Transport for TcpTransport {
    type SendStream = WriteHalf<TcpStream>;
    type RecvStream = ReadHalf<TcpStream>;

    async fn accept(&self) -> io::Result<(Self::SendStream, Self::RecvStream)> {
        let (stream, peer) = self.listener.accept().await?;
        tracing::debug!(%peer, "accepted connection");

        let (recv, send) = tokio::io::split(stream);

        Ok((send, recv))
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<(Self::SendStream, Self::RecvStream)> {
        let stream = TcpStream::connect(addr).await?;

        let (recv, send) = tokio::io::split(stream);

        Ok((send, recv))
    }
}
