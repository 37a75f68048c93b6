//! # Signature Algorithm Trait
//!
//! One implementation per curve family. Callers select an implementation
//! through the [`registry`](crate::registry) by name or tag.

use crate::{CryptoError, PrivateKey};
use shared_types::{AlgorithmTag, PublicKey, Signature};

/// A 32-byte message digest; the only thing algorithms ever sign.
pub type Digest = [u8; 32];

/// Capability set of a signature algorithm.
///
/// ## Failure policy
///
/// - `verify` never panics. A malformed or foreign signature yields
///   `Ok(false)`; only an unusable public key is an error.
/// - Text parsing returns `None` instead of failing.
pub trait SignatureAlgorithm: Send + Sync {
    /// Wire tag of keys and signatures produced by this algorithm.
    fn tag(&self) -> AlgorithmTag;

    /// Canonical name, as used for registry lookup and account hashing.
    fn name(&self) -> &'static str {
        self.tag().name()
    }

    /// Check `signature` over `digest` against `public_key`.
    ///
    /// # Errors
    ///
    /// `InvalidPublicKey` when the key is tagged for another algorithm or is
    /// not a valid point on the curve.
    fn verify(
        &self,
        digest: &Digest,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError>;

    /// Sign `digest`. Ed25519 and secp256k1 are deterministic; BLS signing
    /// is deterministic too but callers must not rely on it across variants.
    fn sign(&self, digest: &Digest, private_key: &PrivateKey) -> Result<Signature, CryptoError>;

    /// Generate a fresh key pair from the thread-local CSPRNG.
    fn generate_key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError>;

    /// Derive the public key, or `None` when the private key is not a
    /// valid scalar for this curve.
    fn derive_public_key(&self, private_key: &PrivateKey) -> Option<PublicKey>;

    /// Parse a private key from PEM-like text or a raw hex/base64 encoding.
    fn parse_private_key(&self, text: &str) -> Option<PrivateKey>;

    /// Parse a public key from PEM-like text or a raw hex/base64 encoding.
    fn parse_public_key(&self, text: &str) -> Option<PublicKey>;

    /// Reject keys whose tag does not match this algorithm.
    fn check_private_key(&self, private_key: &PrivateKey) -> Result<(), CryptoError> {
        if private_key.algorithm() != self.tag() {
            return Err(CryptoError::AlgorithmMismatch {
                expected: self.tag(),
                actual: private_key.algorithm(),
            });
        }
        Ok(())
    }
}

/// Whether `private_key` and `public_key` belong together under `algorithm`.
///
/// Derives the public key and then runs a sign/verify round trip, so a pair
/// that only matches byte-wise but cannot sign is rejected as well.
pub fn verify_key_pair(
    algorithm: &dyn SignatureAlgorithm,
    private_key: &PrivateKey,
    public_key: &PublicKey,
) -> bool {
    match algorithm.derive_public_key(private_key) {
        Some(derived) if &derived == public_key => {}
        _ => return false,
    }
    let challenge: Digest = *blake3::hash(b"key-pair-challenge").as_bytes();
    algorithm
        .sign(&challenge, private_key)
        .and_then(|signature| algorithm.verify(&challenge, &signature, public_key))
        .unwrap_or(false)
}
