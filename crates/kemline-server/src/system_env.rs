//! Production Environment implementation: real clock, OS entropy.

use std::time::Duration;

use kemline_core::env::Environment;
use rand::rngs::OsRng;
use rand::RngCore;

/// Production environment backed by the Tokio timer and the OS entropy
/// pool.
///
/// Stateless; copies are free and share nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_fills_buffer() {
        let env = SystemEnv;
        let mut buffer = [0u8; 64];
        env.random_bytes(&mut buffer);

        // All-zero output from 64 bytes of OS entropy is effectively
        // impossible; a failure here means the buffer was never written
        assert_ne!(buffer, [0u8; 64]);
    }

    #[test]
    fn two_draws_differ() {
        let env = SystemEnv;
        let mut first = [0u8; 32];
        let mut second = [0u8; 32];
        env.random_bytes(&mut first);
        env.random_bytes(&mut second);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn sleep_completes() {
        let env = SystemEnv;
        env.sleep(Duration::from_millis(1)).await;
    }
}
