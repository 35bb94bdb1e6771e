//! Production KEM handshake server.
//!
//! Binds a real TCP listener, runs the startup self-test, then drives the
//! sequential accept loop from `kemline-core` with the ML-KEM-768 backend,
//! the system clock, and OS entropy.

#![forbid(unsafe_code)]

mod system_env;
mod tcp_transport;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kemline_core::kem::MlKem768;
use kemline_core::selftest::{run_self_test, SelfTestReport};
use kemline_core::server::{serve, ServerConfig};
use tracing_subscriber::EnvFilter;

use crate::system_env::SystemEnv;
use crate::tcp_transport::TcpTransport;

/// Single-client KEM handshake server.
///
/// Serves one connection at a time: sends a fresh ML-KEM-768 public key,
/// waits for the client's ciphertext, derives the shared secret, and
/// closes. Intended for one expected client; there is no concurrency.
#[derive(Parser, Debug)]
#[command(name = "kemline-server", version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5000")]
    listen: SocketAddr,

    /// Timeout for the client's ciphertext line, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    read_timeout_ms: u64,

    /// Delay between connections, in milliseconds
    #[arg(long, default_value_t = 5_000)]
    accept_delay_ms: u64,

    /// Refuse to serve if the startup self-test fails
    #[arg(long)]
    halt_on_self_test_failure: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let env = SystemEnv;

    // The ML-KEM working set is too large for an async task's stack
    let report = tokio::task::spawn_blocking(move || run_self_test(&MlKem768, &env))
        .await
        .context("self-test task panicked")?;

    match &report {
        SelfTestReport::Pass { public_key, ciphertext, shared_secret } => {
            tracing::info!(%public_key, %ciphertext, %shared_secret, "self-test passed");
        },
        SelfTestReport::Failed(failure) => {
            tracing::error!(%failure, "self-test failed");
            if args.halt_on_self_test_failure {
                bail!("startup self-test failed: {failure}");
            }
            tracing::warn!("serving despite self-test failure");
        },
    }

    let transport = TcpTransport::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    tracing::info!(listen = %args.listen, "listening");

    let config = ServerConfig {
        read_timeout: Duration::from_millis(args.read_timeout_ms),
        accept_delay: Duration::from_millis(args.accept_delay_ms),
    };

    serve(&transport, &MlKem768, &env, &config)
        .await
        .context("server loop failed")
}
