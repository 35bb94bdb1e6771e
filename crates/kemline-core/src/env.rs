//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples protocol logic from system resources
//! (time and entropy). This enables:
//!
//! - Deterministic Simulation: Turmoil provides a virtual clock and the
//!   harness provides a seeded RNG, allowing perfect bug reproduction.
//!
//! - Production Runtime: The server binary uses the real Tokio clock and
//!   OS entropy without any code changes to the protocol logic.
//!
//! Every fresh keypair, every encapsulation nonce, and every pacing delay
//! in this crate flows through an `Environment`. Protocol code never calls
//! `rand::thread_rng()` or `tokio::time::sleep()` directly.
//!
//! # Invariants
//!
//! - Determinism: Given the same seed, a simulation `random_bytes()`
//!   produces the same sequence
//! - Entropy quality: Production implementations draw from the OS entropy
//!   pool, never from a non-cryptographic RNG

use std::time::Duration;

/// Abstract environment providing entropy and cooperative delays.
///
/// # Implementations
///
/// - Simulation (`kemline-harness::SimEnv`): virtual time that advances
///   instantly, ChaCha20 RNG seeded for reproducibility.
/// - Production (`kemline-server::SystemEnv`): Tokio timer, OS entropy
///   pool.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Sleeps for the specified duration.
    ///
    /// This is a cooperative yield: the execution context must not
    /// monopolize the processor while waiting. In simulation the virtual
    /// clock advances instantly; in production this parks the task on the
    /// Tokio timer.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Security
    ///
    /// Production implementations MUST use the OS entropy pool. Simulation
    /// implementations MUST use a seeded RNG so runs are reproducible.
    fn random_bytes(&self, buffer: &mut [u8]);
}
