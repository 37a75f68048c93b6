//! BLS12-381 signatures (minimal public key size: G1 keys, G2 signatures).
//!
//! Public keys are 48-byte compressed G1 points and are subgroup-checked on
//! every use. The infinity point is rejected.

use crate::encoding::{decode_key_text, trim_to_key_length};
use crate::{CryptoError, Digest, PrivateKey, SignatureAlgorithm};
use blst::min_pk::{PublicKey as BlstPublicKey, SecretKey, Signature as BlstSignature};
use blst::BLST_ERROR;
use rand::RngCore;
use shared_types::{AlgorithmTag, PublicKey, Signature};
use zeroize::Zeroize;

/// Domain separation tag (proof-of-possession ciphersuite)
const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

const TAG: AlgorithmTag = AlgorithmTag::Bls12381;

/// BLS12-381 signature algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bls12381;

impl Bls12381 {
    fn secret_key(&self, private_key: &PrivateKey) -> Result<SecretKey, CryptoError> {
        self.check_private_key(private_key)?;
        SecretKey::from_bytes(private_key.as_bytes()).map_err(|_| CryptoError::InvalidPrivateKey(TAG))
    }

    fn public_key_point(bytes: &[u8]) -> Result<BlstPublicKey, BLST_ERROR> {
        BlstPublicKey::key_validate(bytes)
    }

    fn to_public_key(point: &BlstPublicKey) -> Option<PublicKey> {
        PublicKey::new(TAG, point.compress().to_vec()).ok()
    }
}

impl SignatureAlgorithm for Bls12381 {
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
        let point = Self::public_key_point(public_key.as_bytes())
            .map_err(|err| CryptoError::invalid_public_key(TAG, format!("{err:?}")))?;

        if signature.algorithm() != TAG {
            return Ok(false);
        }
        let Ok(sig) = BlstSignature::from_bytes(signature.as_bytes()) else {
            return Ok(false);
        };
        Ok(sig.verify(true, digest, DST, &[], &point, false) == BLST_ERROR::BLST_SUCCESS)
    }

    fn sign(&self, digest: &Digest, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
        let secret = self.secret_key(private_key)?;
        let sig = secret.sign(digest, DST, &[]);
        Signature::new(TAG, sig.compress().to_vec()).map_err(|_| CryptoError::InvalidPrivateKey(TAG))
    }

    fn generate_key_pair(&self) -> Result<(PrivateKey, PublicKey), CryptoError> {
        let mut ikm = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ikm);
        let secret = SecretKey::key_gen(&ikm, &[]);
        ikm.zeroize();
        let secret = secret.map_err(|err| CryptoError::KeyGenerationFailed(format!("{err:?}")))?;

        let mut secret_bytes = secret.to_bytes();
        let private_key = PrivateKey::new(TAG, secret_bytes.to_vec());
        secret_bytes.zeroize();
        let public_key = Self::to_public_key(&secret.sk_to_pk())
            .ok_or_else(|| CryptoError::KeyGenerationFailed("public key encoding".into()))?;
        Ok((private_key?, public_key))
    }

    fn derive_public_key(&self, private_key: &PrivateKey) -> Option<PublicKey> {
        let secret = self.secret_key(private_key).ok()?;
        Self::to_public_key(&secret.sk_to_pk())
    }

    fn parse_private_key(&self, text: &str) -> Option<PrivateKey> {
        let bytes = decode_key_text(text)?;
        let raw = trim_to_key_length(&bytes, TAG.private_key_length())?;
        let private_key = PrivateKey::new(TAG, raw.to_vec()).ok()?;
        self.secret_key(&private_key).ok()?;
        Some(private_key)
    }

    fn parse_public_key(&self, text: &str) -> Option<PublicKey> {
        let bytes = decode_key_text(text)?;
        let raw = trim_to_key_length(&bytes, TAG.public_key_length())?;
        let point = Self::public_key_point(raw).ok()?;
        Self::to_public_key(&point)
    }
}
