//! # Ed25519
//!
//! Twisted Edwards curve signatures with deterministic nonces. The 32-byte
//! digest is signed directly as the message.

use crate::encoding::{decode_key_text, trim_to_key_length};
use crate::{CryptoError, Digest, PrivateKey, SignatureAlgorithm};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use shared_types::{AlgorithmTag, PublicKey, Signature};

const TAG: AlgorithmTag = AlgorithmTag::Ed25519;

/// Ed25519 signature algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519;

impl Ed25519 {
    fn signing_key(&self, private_key: &PrivateKey) -> Result<SigningKey, CryptoError> {
        self.check_private_key(private_key)?;
        Ok(SigningKey::from_bytes(&private_key.as_array()?))
    }

    fn to_public_key(verifying_key: &VerifyingKey) -> Option<PublicKey> {
        PublicKey::new(TAG, verifying_key.to_bytes().to_vec()).ok()
    }
}

impl SignatureAlgorithm for Ed25519 {
    fn tag(&self) -> AlgorithmTag {
        TAG
    }

    fn verify(
        &self,
        digest: &Digest,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> Result<bool, CryptoError> {
        if public_key.algorithm() != TAG {
            return Err(CryptoError::invalid_public_key(TAG, "foreign algorithm tag"));
        }
        let key_bytes = <[u8; 32]>::try_from(public_key.as_bytes())
            .map_err(|_| CryptoError::invalid_public_key(TAG, "wrong length"))?;
        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|_| CryptoError::invalid_public_key(TAG, "not a curve point"))?;

        if signature.algorithm() != TAG {
            return Ok(false);
        }
        let Ok(sig) = ed25519_dalek::Signature::from_slice(signature.as_bytes()) else {
            return Ok(false);
        };
        Ok(verifying_key.verify(digest, &sig).is_ok())
    }

    fn sign(&self, digest: &Digest, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        let signing_key = self.signing_key(private_key)?;
        let sig = signing_key.sign(digest);
        Signature::new(TAG, sig.to_bytes().to_vec()).map_err(|_| CryptoError::InvalidPrivateKey(TAG))
    }

    fn generate_key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let private_key = PrivateKey::new(TAG, signing_key.to_bytes().to_vec())?;
        let public_key = Self::to_public_key(&signing_key.verifying_key())
            .ok_or_else(|| CryptoError::KeyGenerationFailed("public key encoding".into()))?;
        Ok((private_key, public_key))
    }

    fn derive_public_key(&self, private_key: &PrivateKey) -> Option<PublicKey> {
        let signing_key = self.signing_key(private_key).ok()?;
        Self::to_public_key(&signing_key.verifying_key())
    }

    fn parse_private_key(&self, text: &str) -> Option<PrivateKey> {
        let bytes = decode_key_text(text)?;
        let raw = trim_to_key_length(&bytes, TAG.private_key_length())?;
        PrivateKey::new(TAG, raw.to_vec()).ok()
    }

    fn parse_public_key(&self, text: &str) -> Option<PublicKey> {
        let bytes = decode_key_text(text)?;
        let raw = trim_to_key_length(&bytes, TAG.public_key_length())?;
        let key_bytes = <[u8; 32]>::try_from(raw).ok()?;
        VerifyingKey::from_bytes(&key_bytes).ok()?;
        PublicKey::new(TAG, raw.to_vec()).ok()
    }
}
