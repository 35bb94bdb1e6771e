//! Accept-loop behavior under virtual time.
//!
//! These tests run the real `serve()` loop inside a Turmoil simulation and
//! verify its two loop-level guarantees: connections are handled strictly
//! one at a time with a fixed delay between them, and a failed session
//! never stops the loop from serving the next client.

use std::time::Duration;

use kemline_core::kem::{Kem, MlKem768};
use kemline_core::reader::read_line;
use kemline_core::server::{serve, ServerConfig};
use kemline_harness::{SimEnv, SimTransport};
use kemline_proto::line;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn max_len() -> usize {
    line::max_line_len(MlKem768::PK_LEN, MlKem768::CT_LEN)
}

/// A silent first client must not starve a second client forever, but the
/// second client is only served after the first session's read timeout
/// plus the inter-connection delay have both elapsed.
#[test]
fn connections_are_served_sequentially_with_accept_delay() {
    let mut sim = turmoil::Builder::new().build();

    sim.host("server", || async {
        let transport = SimTransport::bind("0.0.0.0:5000").await?;
        let env = SimEnv::with_seed(1);
        let config = ServerConfig {
            read_timeout: Duration::from_secs(1),
            accept_delay: Duration::from_secs(2),
        };

        serve(&transport, &MlKem768, &env, &config).await?;
        Ok(())
    });

    // First client: connects immediately and never sends its ciphertext
    sim.client("silent", async {
        let stream = SimTransport::connect_to("server:5000").await?;
        let (mut recv, send) = tokio::io::split(stream);

        let _pk = read_line(&mut recv, Duration::from_secs(5), max_len()).await.unwrap();

        // Hold the connection until the server gives up and closes it
        let mut buf = [0u8; 1];
        let n = recv.read(&mut buf).await?;
        assert_eq!(n, 0, "server must close the timed-out connection");
        drop((recv, send));

        Ok(())
    });

    // Second client: connects while the first session is still pending and
    // measures how long the server makes it wait for its PK line
    sim.client("patient", async {
        let started = tokio::time::Instant::now();

        // Let the silent client win the race for the first accept
        tokio::time::sleep(Duration::from_millis(100)).await;

        let stream = SimTransport::connect_to("server:5000").await?;
        let (mut recv, mut send) = tokio::io::split(stream);

        let pk_line = read_line(&mut recv, Duration::from_secs(30), max_len()).await.unwrap();

        // 1s read timeout for the silent client + 2s accept delay
        assert!(
            started.elapsed() >= Duration::from_millis(2900),
            "served after {:?}, before the previous session finished",
            started.elapsed()
        );

        // The loop survived the timed-out session; finish a real handshake
        let pk = line::parse_public_key_line(&pk_line, MlKem768::PK_LEN).unwrap();
        let env = SimEnv::with_seed(7);
        let (ct, _secret) = MlKem768.encapsulate(&pk, &env).unwrap();
        send.write_all(line::ciphertext_line(&ct).as_bytes()).await?;
        send.write_all(b"\n").await?;

        let mut buf = [0u8; 1];
        let n = recv.read(&mut buf).await?;
        assert_eq!(n, 0, "server must close after deriving the secret");

        Ok(())
    });

    sim.run().expect("simulation should complete successfully");
}

/// A burst of garbage-speaking clients followed by a correct one: the loop
/// serves all of them in order and the correct client completes normally.
#[test]
fn loop_survives_repeated_aborts() {
    let mut sim = turmoil::Builder::new().build();

    sim.host("server", || async {
        let transport = SimTransport::bind("0.0.0.0:5000").await?;
        let env = SimEnv::with_seed(1);
        let config = ServerConfig {
            read_timeout: Duration::from_secs(1),
            accept_delay: Duration::from_millis(100),
        };

        serve(&transport, &MlKem768, &env, &config).await?;
        Ok(())
    });

    sim.client("client", async {
        // Three connections that each abort for a different reason
        for garbage in [&b"CT:zz\n"[..], &b"HELLO\n"[..], &b"CT:00\n"[..]] {
            let stream = SimTransport::connect_to("server:5000").await?;
            let (mut recv, mut send) = tokio::io::split(stream);

            let _pk = read_line(&mut recv, Duration::from_secs(10), max_len()).await.unwrap();
            send.write_all(garbage).await?;

            let mut buf = [0u8; 1];
            let n = recv.read(&mut buf).await?;
            assert_eq!(n, 0);
            drop((recv, send));
        }

        // The loop is still serving; complete a valid handshake
        let stream = SimTransport::connect_to("server:5000").await?;
        let (mut recv, mut send) = tokio::io::split(stream);

        let pk_line = read_line(&mut recv, Duration::from_secs(10), max_len()).await.unwrap();
        let pk = line::parse_public_key_line(&pk_line, MlKem768::PK_LEN).unwrap();

        let env = SimEnv::with_seed(42);
        let (ct, _secret) = MlKem768.encapsulate(&pk, &env).unwrap();
        send.write_all(line::ciphertext_line(&ct).as_bytes()).await?;
        send.write_all(b"\n").await?;

        let mut buf = [0u8; 1];
        let n = recv.read(&mut buf).await?;
        assert_eq!(n, 0);

        Ok(())
    });

    sim.run().expect("simulation should complete successfully");
}
