//! Shared helpers for unit tests: a seeded environment and a toy KEM.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::env::Environment;
use crate::error::KemError;
use crate::kem::{Kem, KeyPair, SecretKey, SharedSecret};

/// Deterministic test environment with a seeded ChaCha20 RNG.
///
/// Clones share RNG state so a test and the code under test draw from one
/// sequence, mirroring how the harness `SimEnv` behaves.
#[derive(Clone)]
pub(crate) struct TestEnv {
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl TestEnv {
    pub(crate) fn with_seed(seed: u64) -> Self {
        Self { rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))) }
    }
}

impl Environment for TestEnv {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng
            .lock()
            .unwrap_or_else(|e| unreachable!("test RNG mutex poisoned: {e}"))
            .fill_bytes(buffer);
    }
}

/// Toy KEM for fast unit tests.
///
/// The "public key" equals the secret key and the shared secret is
/// `pk XOR ct`, so encapsulation and decapsulation agree by construction.
/// Cryptographically worthless, structurally faithful.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct XorKem;

pub(crate) const XOR_KEM_LEN: usize = 8;

impl Kem for XorKem {
    const PK_LEN: usize = XOR_KEM_LEN;
    const SK_LEN: usize = XOR_KEM_LEN;
    const CT_LEN: usize = XOR_KEM_LEN;
    const SS_LEN: usize = XOR_KEM_LEN;

    fn keypair(&self, env: &impl Environment) -> Result<KeyPair, KemError> {
        let mut sk = vec![0u8; XOR_KEM_LEN];
        env.random_bytes(&mut sk);
        Ok(KeyPair { public: sk.clone(), secret: SecretKey::new(sk) })
    }

    fn encapsulate(
        &self,
        public_key: &[u8],
        env: &impl Environment,
    ) -> Result<(Vec<u8>, SharedSecret), KemError> {
        if public_key.len() != XOR_KEM_LEN {
            return Err(KemError::InvalidPublicKey(public_key.len()));
        }
        let mut ct = vec![0u8; XOR_KEM_LEN];
        env.random_bytes(&mut ct);
        let ss: Vec<u8> = public_key.iter().zip(&ct).map(|(a, b)| a ^ b).collect();
        Ok((ct, SharedSecret::new(ss)))
    }

    fn decapsulate(
        &self,
        ciphertext: &[u8],
        secret_key: &SecretKey,
    ) -> Result<SharedSecret, KemError> {
        if ciphertext.len() != XOR_KEM_LEN {
            return Err(KemError::InvalidCiphertext(ciphertext.len()));
        }
        let ss: Vec<u8> = secret_key
            .expose()
            .iter()
            .zip(ciphertext)
            .map(|(a, b)| a ^ b)
            .collect();
        Ok(SharedSecret::new(ss))
    }
}
