//! # Algorithm Registry
//!
//! Process-wide, immutable lookup table from algorithm name or tag to its
//! implementation. Built once on first use and never mutated.

use crate::bls::Bls12381;
use crate::ed25519::Ed25519;
use crate::secp256k1::Secp256k1;
use crate::{CryptoError, Digest, SignatureAlgorithm};
use lazy_static::lazy_static;
use shared_types::{AlgorithmTag, PublicKey, Signature};
use std::collections::HashMap;

static ED25519: Ed25519 = Ed25519;
static SECP256K1: Secp256k1 = Secp256k1;
static BLS12_381: Bls12381 = Bls12381;

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, &'static dyn SignatureAlgorithm> =
        algorithms().into_iter().map(|alg| (alg.name(), alg)).collect();
}

/// All registered algorithms in tag order.
pub fn algorithms() -> [&'static dyn SignatureAlgorithm; 3] {
    [&ED25519, &SECP256K1, &BLS12_381]
}

/// Implementation for a wire tag. Every tag has one.
pub fn by_tag(tag: AlgorithmTag) -> &'static dyn SignatureAlgorithm {
    match tag {
        AlgorithmTag::Ed25519 => &ED25519,
        AlgorithmTag::Secp256k1 => &SECP256K1,
        AlgorithmTag::Bls12381 => &BLS12_381,
    }
}

/// Implementation registered under `name` (`"ed25519"`, `"secp256k1"`, `"bls12-381"`).
pub fn by_name(name: &str) -> Result<&'static dyn SignatureAlgorithm, CryptoError> {
    BY_NAME
        .get(name)
        .copied()
        .ok_or_else(|| CryptoError::UnknownAlgorithm(name.to_string()))
}

/// Verify with whichever algorithm the public key is tagged for.
pub fn verify_signature(
    digest: &Digest,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    by_tag(public_key.algorithm()).verify(digest, signature, public_key)
}
