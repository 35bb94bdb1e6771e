//! Turmoil-based Transport implementation using simulated TCP streams.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use kemline_core::transport::Transport;
use tokio::io::{ReadHalf, WriteHalf};
use turmoil::net::{TcpListener, TcpStream};

/// Simulation transport using Turmoil's deterministic TCP streams.
///
/// This transport provides:
///
/// - **Deterministic delivery**: Turmoil controls packet ordering and
///   timing
/// - **Fault injection**: can simulate packet loss, delays, and partitions
/// - **Stream semantics**: reliable, ordered byte delivery, which is all
///   the line protocol requires
///
/// The production counterpart is `kemline-server`'s Tokio TCP transport;
/// both split one bidirectional stream into send/receive halves.
pub struct SimTransport {
    listener: TcpListener,
}

impl SimTransport {
    /// Binds to the specified address for accepting connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is already in use or invalid.
    pub async fn bind(address: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener })
    }

    /// Connects to a remote address by name, for client-side test code.
    ///
    /// The caller should use `tokio::io::split()` to separate the stream
    /// into read and write halves.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote host is unreachable or refuses the
    /// connection.
    pub async fn connect_to(address: &str) -> io::Result<TcpStream> {
        TcpStream::connect(address).await
    }
}

#[async_trait]
impl Transport for SimTransport {
    type SendStream = WriteHalf<TcpStream>;
    type RecvStream = ReadHalf<TcpStream>;

    async fn accept(&self) -> io::Result<(Self::SendStream, Self::RecvStream)> {
        let (stream, _addr) = self.listener.accept().await?;

        let (recv, send) = tokio::io::split(stream);

        Ok((send, recv))
    }

    async fn connect(&self, addr: SocketAddr) -> io::Result<(Self::SendStream, Self::RecvStream)> {
        let stream = TcpStream::connect(addr).await?;

        let (recv, send) = tokio::io::split(stream);

        Ok((send, recv))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    #[test]
    fn sim_transport_echo() {
        let mut sim = turmoil::Builder::new().build();

        // Server: echo back whatever is received
        sim.host("server", || async {
            let transport = SimTransport::bind("0.0.0.0:5000").await?;
            let (mut send, mut recv) = transport.accept().await?;

            let mut buf = [0u8; 128];
            let n = recv.read(&mut buf).await?;

            send.write_all(&buf[..n]).await?;

            Ok(())
        });

        // Client: send message, verify echo
        sim.client("client", async {
            let stream = SimTransport::connect_to("server:5000").await?;
            let (mut recv, mut send) = tokio::io::split(stream);

            let message = b"PK:00\n";
            send.write_all(message).await?;

            let mut buf = vec![0u8; message.len()];
            recv.read_exact(&mut buf).await?;

            assert_eq!(&buf, message);

            Ok(())
        });

        sim.run().expect("simulation failed");
    }

    #[test]
    fn sim_transport_line_exchange() {
        let mut sim = turmoil::Builder::new().build();

        // Server: send a line, expect a line back
        sim.host("server", || async {
            let transport = SimTransport::bind("0.0.0.0:5000").await?;
            let (mut send, mut recv) = transport.accept().await?;

            send.write_all(b"PK:ab\n").await?;

            let mut buf = [0u8; 6];
            recv.read_exact(&mut buf).await?;
            assert_eq!(&buf, b"CT:cd\n");

            Ok(())
        });

        sim.client("client", async {
            let stream = SimTransport::connect_to("server:5000").await?;
            let (mut recv, mut send) = tokio::io::split(stream);

            let mut buf = [0u8; 6];
            recv.read_exact(&mut buf).await?;
            assert_eq!(&buf, b"PK:ab\n");

            send.write_all(b"CT:cd\n").await?;

            Ok(())
        });

        sim.run().expect("simulation failed");
    }
}
