//! # Private Keys
//!
//! Secret scalars tagged with their algorithm. The bytes are wiped on drop
//! and never printed.

use crate::CryptoError;
use shared_types::AlgorithmTag;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A private key for one signature algorithm.
///
/// Only the length is checked at construction. Whether the bytes form a
/// valid scalar is decided by the owning algorithm when the key is used.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    algorithm: AlgorithmTag,
    bytes: Vec<u8>,
}

impl PrivateKey {
    /// Wrap raw secret bytes, checking the algorithm's fixed length.
    pub fn new(algorithm: AlgorithmTag, bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.len() != algorithm.private_key_length() {
            return Err(CryptoError::InvalidPrivateKey(algorithm));
        }
        Ok(Self { algorithm, bytes })
    }

    /// Algorithm this key belongs to.
    pub fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Secret bytes as the fixed 32-byte array every supported curve uses.
    pub(crate) fn as_array(&self) -> Result<[u8; 32], CryptoError> {
        <[u8; 32]>::try_from(self.bytes.as_slice())
            .map_err(|_| CryptoError::InvalidPrivateKey(self.algorithm))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}:<redacted>)", self.algorithm)
    }
}
