//! Turmoil-based Environment implementation for deterministic testing.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use kemline_core::env::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Simulation environment using Turmoil's virtual time and a seeded RNG.
///
/// This implementation provides:
///
/// - **Virtual Time**: `sleep()` advances Turmoil's simulated clock
///   instantly, with no wall-clock delay.
///
/// - **Seeded RNG**: `random_bytes()` uses ChaCha20Rng seeded with a fixed
///   value, so every keypair and encapsulation in a test run is
///   reproducible.
///
/// # Determinism
///
/// The RNG is seeded with 0 by default. For testing different random
/// scenarios while keeping reproducibility, construct with
/// `SimEnv::with_seed(n)`.
///
/// # Usage
///
/// `SimEnv` must be used inside a Turmoil simulation context (created by
/// `turmoil::Builder`); `sleep()` panics outside one.
#[derive(Clone)]
pub struct SimEnv {
    /// Seeded RNG for deterministic random bytes.
    ///
    /// Wrapped in `Arc<Mutex<_>>` so clones share one RNG sequence.
    /// Turmoil is single-threaded, so this mutex never blocks.
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl SimEnv {
    /// Creates a `SimEnv` with the default seed (0).
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Creates a `SimEnv` with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng
            .lock()
            .unwrap_or_else(|e| {
                // Turmoil is single threaded; the mutex can only be
                // poisoned if another thread panics while holding it
                unreachable!("RNG mutex poisoned in single-threaded context: {}", e)
            })
            .fill_bytes(buffer);
    }
}
