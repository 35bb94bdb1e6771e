//! Startup self-test for the KEM capability.
//!
//! Runs exactly once, before the server starts serving clients: generate a
//! keypair, encapsulate against it, decapsulate the result, and verify the
//! two shared secrets agree bit for bit. Each step short-circuits on
//! failure; no step is retried.
//!
//! The routine is a diagnostic, not a gate: the server loop starts
//! regardless of the outcome unless the operator opts into halting via the
//! server's `halt_on_self_test_failure` policy.
//!
//! The KEM working set is larger than an async task should carry on its
//! stack, so callers run this on a dedicated blocking task and await its
//! completion before declaring startup complete.

use kemline_proto::hex;
use thiserror::Error;

use crate::env::Environment;
use crate::error::KemError;
use crate::kem::Kem;

/// Bytes of each artifact shown in diagnostics.
const PREVIEW_BYTES: usize = 8;

/// Outcome of one self-test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfTestReport {
    /// All steps succeeded and the secrets agree.
    ///
    /// Carries short hex previews of the artifacts for human diagnostics;
    /// full secret material is never reported.
    Pass {
        /// Preview of the generated public key
        public_key: String,
        /// Preview of the test ciphertext
        ciphertext: String,
        /// Preview of the agreed shared secret
        shared_secret: String,
    },
    /// A step failed or the secrets disagreed.
    Failed(SelfTestFailure),
}

impl SelfTestReport {
    /// Returns true if the self-test passed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, SelfTestReport::Pass { .. })
    }
}

/// The step at which a self-test run failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelfTestFailure {
    /// Keypair generation failed; no further KEM calls were made
    #[error("keypair generation failed: {0}")]
    Keypair(KemError),

    /// Encapsulation against the fresh public key failed
    #[error("encapsulation failed: {0}")]
    Encapsulation(KemError),

    /// Decapsulation of the test ciphertext failed
    #[error("decapsulation failed: {0}")]
    Decapsulation(KemError),

    /// Both secrets were derived but disagree.
    ///
    /// Carries both secrets' full hex for diagnosis; they are test
    /// artifacts of a broken primitive, not live key material.
    #[error("shared secrets disagree: encapsulated {encapsulated}, decapsulated {decapsulated}")]
    Mismatch {
        /// Hex of the encapsulator's secret
        encapsulated: String,
        /// Hex of the decapsulator's secret
        decapsulated: String,
    },
}

/// Exercises the KEM capability end to end, once.
///
/// Steps, each short-circuiting on failure: keypair generation,
/// encapsulation, decapsulation, byte-wise secret comparison. Reporting is
/// the only side effect; no state persists and the server loop is
/// unaffected by the outcome.
pub fn run_self_test<K: Kem>(kem: &K, env: &impl Environment) -> SelfTestReport {
    tracing::debug!("self-test: generating keypair");
    let keypair = match kem.keypair(env) {
        Ok(kp) => kp,
        Err(e) => {
            tracing::error!(error = %e, "self-test: keypair generation failed");
            return SelfTestReport::Failed(SelfTestFailure::Keypair(e));
        },
    };

    tracing::debug!(
        public_key = %hex::preview(&keypair.public, PREVIEW_BYTES),
        "self-test: encapsulating"
    );
    let (ciphertext, encapsulated) = match kem.encapsulate(&keypair.public, env) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(error = %e, "self-test: encapsulation failed");
            return SelfTestReport::Failed(SelfTestFailure::Encapsulation(e));
        },
    };

    tracing::debug!(
        ciphertext = %hex::preview(&ciphertext, PREVIEW_BYTES),
        "self-test: decapsulating"
    );
    let decapsulated = match kem.decapsulate(&ciphertext, &keypair.secret) {
        Ok(ss) => ss,
        Err(e) => {
            tracing::error!(error = %e, "self-test: decapsulation failed");
            return SelfTestReport::Failed(SelfTestFailure::Decapsulation(e));
        },
    };

    if !encapsulated.ct_eq(&decapsulated) {
        // Inequality is a failure signal, never silently ignored
        tracing::error!("self-test: shared secrets disagree");
        return SelfTestReport::Failed(SelfTestFailure::Mismatch {
            encapsulated: hex::encode(encapsulated.as_bytes()),
            decapsulated: hex::encode(decapsulated.as_bytes()),
        });
    }

    SelfTestReport::Pass {
        public_key: hex::preview(&keypair.public, PREVIEW_BYTES),
        ciphertext: hex::preview(&ciphertext, PREVIEW_BYTES),
        shared_secret: hex::preview(encapsulated.as_bytes(), PREVIEW_BYTES),
    }
}
