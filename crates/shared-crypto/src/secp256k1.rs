//! # ECDSA over secp256k1
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization; high-S signatures do not verify
//! - The digest is signed as a prehash, it is not hashed again
//!
//! ## Key Formats
//!
//! Public keys are stored compressed (33 bytes). Parsing also accepts
//! uncompressed SEC1 points and SubjectPublicKeyInfo DER. Private keys may
//! be SEC1 (`EC PRIVATE KEY`) or PKCS#8 DER, or a raw 32-byte scalar.

use crate::encoding::{decode_key_text, trim_to_key_length};
use crate::{CryptoError, Digest, PrivateKey, SignatureAlgorithm};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use shared_types::{AlgorithmTag, PublicKey, Signature};

const TAG: AlgorithmTag = AlgorithmTag::Secp256k1;

/// secp256k1 ECDSA signature algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1;

impl Secp256k1 {
    fn signing_key(&self, private_key: &PrivateKey) -> Result<SigningKey, CryptoError> {
        self.check_private_key(private_key)?;
        SigningKey::from_slice(private_key.as_bytes())
            .map_err(|_| CryptoError::InvalidPrivateKey(TAG))
    }

    fn compressed(public_key: &k256::PublicKey) -> Option<PublicKey> {
        PublicKey::new(TAG, public_key.to_encoded_point(true).as_bytes().to_vec()).ok()
    }

    fn private_from_der(der: &[u8]) -> Option<k256::SecretKey> {
        k256::SecretKey::from_sec1_der(der)
            .or_else(|_| k256::SecretKey::from_pkcs8_der(der))
            .ok()
    }

    fn public_from_bytes(bytes: &[u8]) -> Option<k256::PublicKey> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .or_else(|_| k256::PublicKey::from_public_key_der(bytes))
            .ok()
    }
}

impl SignatureAlgorithm for Secp256k1 {
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
        let verifying_key = VerifyingKey::from_sec1_bytes(public_key.as_bytes())
            .map_err(|_| CryptoError::invalid_public_key(TAG, "not a curve point"))?;

        if signature.algorithm() != TAG {
            return Ok(false);
        }
        let Ok(sig) = k256::ecdsa::Signature::from_slice(signature.as_bytes()) else {
            return Ok(false);
        };
        Ok(verifying_key.verify_prehash(digest, &sig).is_ok())
    }

    fn sign(&self, digest: &Digest, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        let signing_key = self.signing_key(private_key)?;
        let sig: k256::ecdsa::Signature = signing_key
            .sign_prehash(digest)
            .map_err(|_| CryptoError::InvalidPrivateKey(TAG))?;
        let sig = sig.normalize_s().unwrap_or(sig);
        Signature::new(TAG, sig.to_bytes().to_vec()).map_err(|_| CryptoError::InvalidPrivateKey(TAG))
    }

    fn generate_key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let private_key = PrivateKey::new(TAG, signing_key.to_bytes().to_vec())?;
        let public_key = Self::compressed(&k256::PublicKey::from(signing_key.verifying_key()))
            .ok_or_else(|| CryptoError::KeyGenerationFailed("public key encoding".into()))?;
        Ok((private_key, public_key))
    }

    fn derive_public_key(&self, private_key: &PrivateKey) -> Option<PublicKey> {
        let signing_key = self.signing_key(private_key).ok()?;
        Self::compressed(&k256::PublicKey::from(signing_key.verifying_key()))
    }

    fn parse_private_key(&self, text: &str) -> Option<PrivateKey> {
        let bytes = decode_key_text(text)?;
        if let Some(secret) = Self::private_from_der(&bytes) {
            return PrivateKey::new(TAG, secret.to_bytes().to_vec()).ok();
        }
        let raw = trim_to_key_length(&bytes, TAG.private_key_length())?;
        let private_key = PrivateKey::new(TAG, raw.to_vec()).ok()?;
        self.signing_key(&private_key).ok()?;
        Some(private_key)
    }

    fn parse_public_key(&self, text: &str) -> Option<PublicKey> {
        let bytes = decode_key_text(text)?;
        if let Some(public_key) = Self::public_from_bytes(&bytes) {
            return Self::compressed(&public_key);
        }
        let raw = trim_to_key_length(&bytes, TAG.public_key_length())?;
        Self::compressed(&k256::PublicKey::from_sec1_bytes(raw).ok()?)
    }
}
