//! # Identity Values
//!
//! Algorithm-tagged public keys and signatures.
//!
//! ## Wire Format
//!
//! Both types serialize as `algorithm_tag:u8 ++ bytes`, where the byte length
//! is fixed per algorithm:
//!
//! | Algorithm | Tag | Public key | Signature | Private key |
//! |-----------|-----|------------|-----------|-------------|
//! | Ed25519 | 1 | 32 | 64 | 32 |
//! | secp256k1 | 2 | 33 (compressed) | 64 (r‖s) | 32 |
//! | BLS12-381 | 3 | 48 (G1, compressed) | 96 (G2) | 32 |

use crate::errors::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a signature algorithm, carried as a single byte on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AlgorithmTag {
    Ed25519 = 1,
    Secp256k1 = 2,
    Bls12381 = 3,
}

impl AlgorithmTag {
    /// All tags in wire order.
    pub const ALL: [AlgorithmTag; 3] = [
        AlgorithmTag::Ed25519,
        AlgorithmTag::Secp256k1,
        AlgorithmTag::Bls12381,
    ];

    /// Decode a tag byte.
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Ed25519),
            2 => Some(Self::Secp256k1),
            3 => Some(Self::Bls12381),
            _ => None,
        }
    }

    /// Look a tag up by its canonical algorithm name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }

    /// Canonical algorithm name. Mixed into account hashes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
            Self::Secp256k1 => "secp256k1",
            Self::Bls12381 => "bls12-381",
        }
    }

    pub fn public_key_length(self) -> usize {
        match self {
            Self::Ed25519 => 32,
            Self::Secp256k1 => 33,
            Self::Bls12381 => 48,
        }
    }

    pub fn signature_length(self) -> usize {
        match self {
            Self::Ed25519 | Self::Secp256k1 => 64,
            Self::Bls12381 => 96,
        }
    }

    pub fn private_key_length(self) -> usize {
        32
    }
}

impl fmt::Display for AlgorithmTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read the leading algorithm tag and the fixed-length body that follows it.
fn take_tagged<'a>(
    bytes: &'a [u8],
    length_of: fn(AlgorithmTag) -> usize,
) -> Result<(AlgorithmTag, &'a [u8], &'a [u8]), ParseError> {
    let (&tag_byte, rest) = bytes.split_first().ok_or(ParseError::TruncatedInput {
        expected: 1,
        actual: 0,
    })?;
    let tag = AlgorithmTag::from_u8(tag_byte).ok_or(ParseError::UnknownAlgorithm(tag_byte))?;
    let len = length_of(tag);
    if rest.len() < len {
        return Err(ParseError::TruncatedInput {
            expected: len + 1,
            actual: bytes.len(),
        });
    }
    let (body, rest) = rest.split_at(len);
    Ok((tag, body, rest))
}

fn check_length(tag: AlgorithmTag, expected: usize, actual: usize) -> Result<(), ParseError> {
    if expected != actual {
        return Err(ParseError::InvalidLength {
            algorithm: tag.name(),
            expected,
            actual,
        });
    }
    Ok(())
}

/// Serde carrier for tagged values; routes deserialization through the
/// length-checking constructors.
#[derive(Clone, Serialize, Deserialize)]
struct TaggedBytes {
    algorithm: AlgorithmTag,
    bytes: Vec<u8>,
}

/// A public key tagged with its algorithm.
///
/// Construction only checks the length. The bytes are not trusted to be a
/// valid curve point until a signature algorithm has accepted them.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "TaggedBytes", into = "TaggedBytes")]
pub struct PublicKey {
    algorithm: AlgorithmTag,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Wrap raw key bytes, checking the algorithm's fixed length.
    pub fn new(algorithm: AlgorithmTag, bytes: impl Into<Vec<u8>>) -> Result<Self, ParseError> {
        let bytes = bytes.into();
        check_length(algorithm, algorithm.public_key_length(), bytes.len())?;
        Ok(Self { algorithm, bytes })
    }

    pub fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    /// Raw key bytes without the algorithm tag.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the tagged wire form.
    pub fn serialized_length(&self) -> usize {
        1 + self.bytes.len()
    }

    /// Append the tagged wire form to `out`.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(self.algorithm as u8);
        out.extend_from_slice(&self.bytes);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_length());
        self.write_bytes(&mut out);
        out
    }

    /// Decode a tagged public key from the front of `bytes`, returning the rest.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        let (algorithm, body, rest) = take_tagged(bytes, AlgorithmTag::public_key_length)?;
        Ok((
            Self {
                algorithm,
                bytes: body.to_vec(),
            },
            rest,
        ))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl TryFrom<TaggedBytes> for PublicKey {
    type Error = ParseError;

    fn try_from(raw: TaggedBytes) -> Result<Self, Self::Error> {
        Self::new(raw.algorithm, raw.bytes)
    }
}

impl From<PublicKey> for TaggedBytes {
    fn from(key: PublicKey) -> Self {
        Self {
            algorithm: key.algorithm,
            bytes: key.bytes,
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}:{})", self.algorithm, self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.algorithm, self.to_hex())
    }
}

/// A signature tagged with the algorithm that produced it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TaggedBytes", into = "TaggedBytes")]
pub struct Signature {
    algorithm: AlgorithmTag,
    bytes: Vec<u8>,
}

impl Signature {
    /// Wrap raw signature bytes, checking the algorithm's fixed length.
    pub fn new(algorithm: AlgorithmTag, bytes: impl Into<Vec<u8>>) -> Result<Self, ParseError> {
        let bytes = bytes.into();
        check_length(algorithm, algorithm.signature_length(), bytes.len())?;
        Ok(Self { algorithm, bytes })
    }

    pub fn algorithm(&self) -> AlgorithmTag {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.algorithm as u8);
        out.extend_from_slice(&self.bytes);
        out
    }

    /// Decode a tagged signature, rejecting trailing input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        let (algorithm, body, rest) = take_tagged(bytes, AlgorithmTag::signature_length)?;
        if !rest.is_empty() {
            return Err(ParseError::TrailingBytes(rest.len()));
        }
        Ok(Self {
            algorithm,
            bytes: body.to_vec(),
        })
    }
}

impl TryFrom<TaggedBytes> for Signature {
    type Error = ParseError;

    fn try_from(raw: TaggedBytes) -> Result<Self, Self::Error> {
        Self::new(raw.algorithm, raw.bytes)
    }
}

impl From<Signature> for TaggedBytes {
    fn from(sig: Signature) -> Self {
        Self {
            algorithm: sig.algorithm,
            bytes: sig.bytes,
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}:{})", self.algorithm, hex::encode(&self.bytes))
    }
}
