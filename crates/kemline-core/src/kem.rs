//! KEM capability: trait, key material types, and the ML-KEM-768 backend.
//!
//! The handshake consumes the KEM as an opaque capability with three
//! operations and four size constants. The backend here wraps the
//! `ml-kem` crate's deterministic APIs, drawing all entropy from the
//! caller's [`Environment`] so that simulation runs are reproducible from
//! a seed.
//!
//! # Secret Hygiene
//!
//! - Secret keys are stored as the 64-byte decapsulation seed (FIPS 203
//!   `d || z`), zeroized on drop, and never leave this module except
//!   through [`SecretKey::expose`]
//! - Shared secrets are zeroized on drop and redacted in `Debug` output
//! - A secret key's lifetime is bounded to one self-test run or one
//!   connection's handshake; the session drops it as soon as the shared
//!   secret is derived or the handshake aborts

use std::fmt;

use ml_kem::kem::{Decapsulate, KeyExport};
use ml_kem::{B32, Seed};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::env::Environment;
use crate::error::KemError;

/// ML-KEM-768 public (encapsulation) key size in bytes.
pub const ML_KEM_768_PK_LEN: usize = 1184;

/// ML-KEM-768 secret key (decapsulation seed) size in bytes.
pub const ML_KEM_768_SK_LEN: usize = 64;

/// ML-KEM-768 ciphertext size in bytes.
pub const ML_KEM_768_CT_LEN: usize = 1088;

/// ML-KEM-768 shared secret size in bytes.
pub const ML_KEM_768_SS_LEN: usize = 32;

/// A secret (decapsulation) key, zeroized on drop.
///
/// Never transmitted. The wrapper exists so the raw bytes cannot end up in
/// a log line by accident: `Debug` is redacted and access is explicit.
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Wraps raw secret-key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Accesses the raw secret-key bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

/// A shared secret from encapsulation or decapsulation, zeroized on drop.
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl SharedSecret {
    /// Wraps raw shared-secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Accesses the raw shared-secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Constant-time equality with another shared secret.
    ///
    /// Inequality of the two independently derived secrets is a failure
    /// signal, never silently ignored; the self-test routine reports it as
    /// a mismatch.
    pub fn ct_eq(&self, other: &SharedSecret) -> bool {
        bool::from(self.0.as_slice().ct_eq(other.0.as_slice()))
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<{} bytes redacted>)", self.0.len())
    }
}

/// A freshly generated keypair.
///
/// Created once per self-test run and independently once per accepted
/// connection; never reused across connections.
#[derive(Debug)]
pub struct KeyPair {
    /// Public (encapsulation) key bytes, safe to transmit.
    pub public: Vec<u8>,
    /// Secret (decapsulation) key, zeroized on drop.
    pub secret: SecretKey,
}

/// Key encapsulation mechanism capability.
///
/// Implementations supply fixed byte lengths for keys, ciphertext, and
/// shared secret, plus three fallible operations. Entropy for keypair
/// generation and encapsulation is drawn from the caller's
/// [`Environment`], never from ambient RNG state.
pub trait Kem: Send + Sync + 'static {
    /// Public key length in bytes.
    const PK_LEN: usize;
    /// Secret key length in bytes.
    const SK_LEN: usize;
    /// Ciphertext length in bytes.
    const CT_LEN: usize;
    /// Shared secret length in bytes.
    const SS_LEN: usize;

    /// Generates a fresh keypair.
    ///
    /// # Errors
    ///
    /// Returns [`KemError`] if the backend fails.
    fn keypair(&self, env: &impl Environment) -> Result<KeyPair, KemError>;

    /// Encapsulates against a public key, producing a ciphertext and the
    /// encapsulator's shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`KemError::InvalidPublicKey`] if `public_key` is not a
    /// valid key for this parameter set.
    fn encapsulate(
        &self,
        public_key: &[u8],
        env: &impl Environment,
    ) -> Result<(Vec<u8>, SharedSecret), KemError>;

    /// Decapsulates a ciphertext with the matching secret key, recovering
    /// the shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`KemError`] if the ciphertext or secret key do not fit
    /// this parameter set.
    fn decapsulate(&self, ciphertext: &[u8], secret_key: &SecretKey)
        -> Result<SharedSecret, KemError>;
}

/// ML-KEM-768 backend over the `ml-kem` crate.
///
/// Secret keys are the 64-byte generation seed; the expanded decapsulation
/// key is reconstructed on each use and lives only for the duration of the
/// call. All randomness is drawn from the [`Environment`] and fed into
/// `ml-kem`'s deterministic APIs, so a seeded environment yields fully
/// reproducible keys and ciphertexts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MlKem768;

impl Kem for MlKem768 {
    const PK_LEN: usize = ML_KEM_768_PK_LEN;
    const SK_LEN: usize = ML_KEM_768_SK_LEN;
    const CT_LEN: usize = ML_KEM_768_CT_LEN;
    const SS_LEN: usize = ML_KEM_768_SS_LEN;

    fn keypair(&self, env: &impl Environment) -> Result<KeyPair, KemError> {
        // 64 bytes of randomness: (d || z) per FIPS 203 §7.1
        let mut seed_bytes = Zeroizing::new([0u8; ML_KEM_768_SK_LEN]);
        env.random_bytes(&mut *seed_bytes);

        let seed: Seed = (*seed_bytes).into();
        let dk = ml_kem::DecapsulationKey::<ml_kem::MlKem768>::from_seed(seed);
        let ek = dk.encapsulation_key();
        let public = ek.to_bytes().as_slice().to_vec();

        Ok(KeyPair { public, secret: SecretKey::new(seed_bytes.to_vec()) })
    }

    fn encapsulate(
        &self,
        public_key: &[u8],
        env: &impl Environment,
    ) -> Result<(Vec<u8>, SharedSecret), KemError> {
        let ek_bytes: &[u8; ML_KEM_768_PK_LEN] = public_key
            .try_into()
            .map_err(|_| KemError::InvalidPublicKey(public_key.len()))?;
        let ek = ml_kem::EncapsulationKey::<ml_kem::MlKem768>::new(ek_bytes.into())
            .map_err(|_| KemError::InvalidPublicKey(public_key.len()))?;

        // 32 bytes of encapsulation randomness (message `m`)
        let mut m_bytes = Zeroizing::new([0u8; 32]);
        env.random_bytes(&mut *m_bytes);
        let m: &B32 = (&*m_bytes).into();

        let (ct, ss) = ek.encapsulate_deterministic(m);

        Ok((
            ct.as_slice().to_vec(),
            SharedSecret::new(ss.as_slice().to_vec()),
        ))
    }

    fn decapsulate(
        &self,
        ciphertext: &[u8],
        secret_key: &SecretKey,
    ) -> Result<SharedSecret, KemError> {
        let raw = secret_key.expose();
        if raw.len() != ML_KEM_768_SK_LEN {
            return Err(KemError::InvalidSecretKey(raw.len()));
        }
        let mut seed_bytes = Zeroizing::new([0u8; ML_KEM_768_SK_LEN]);
        seed_bytes.copy_from_slice(raw);
        let seed: Seed = (*seed_bytes).into();

        // The expanded decapsulation key lives on the stack for the
        // duration of this call only.
        let dk = ml_kem::DecapsulationKey::<ml_kem::MlKem768>::from_seed(seed);
        let ct = ml_kem::kem::Ciphertext::<ml_kem::MlKem768>::try_from(ciphertext)
            .map_err(|_| KemError::InvalidCiphertext(ciphertext.len()))?;

        // ML-KEM uses implicit rejection: an invalid-but-well-sized
        // ciphertext yields a pseudorandom secret, not an error.
        let ss = dk.decapsulate(&ct);

        Ok(SharedSecret::new(ss.as_slice().to_vec()))
    }
}
