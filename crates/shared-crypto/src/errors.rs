//! Crypto error types.

use shared_types::AlgorithmTag;
use thiserror::Error;

/// Signature algorithm errors.
///
/// A signature that simply fails to verify is not an error; `verify`
/// returns `Ok(false)` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Public key has the wrong length or is not a valid point for the curve
    #[error("Invalid public key for {algorithm}: {reason}")]
    InvalidPublicKey {
        /// Algorithm that rejected the key
        algorithm: AlgorithmTag,
        /// What was wrong with it
        reason: String,
    },

    /// Private key has the wrong length or is an out-of-range scalar
    #[error("Invalid private key for {0}")]
    InvalidPrivateKey(AlgorithmTag),

    /// Key belongs to a different algorithm than the one asked to use it
    #[error("Algorithm mismatch: expected {expected}, got {actual}")]
    AlgorithmMismatch {
        /// Algorithm performing the operation
        expected: AlgorithmTag,
        /// Algorithm tagged on the key
        actual: AlgorithmTag,
    },

    /// No registered algorithm has this name
    #[error("Unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),
}

impl CryptoError {
    pub(crate) fn invalid_public_key(algorithm: AlgorithmTag, reason: impl Into<String>) -> Self {
        Self::InvalidPublicKey {
            algorithm,
            reason: reason.into(),
        }
    }
}
