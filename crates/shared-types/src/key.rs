//! # Global-State Keys
//!
//! Typed addresses identifying locations in global state.
//!
//! ## Wire Format
//!
//! `tag:u8 ++ payload`, bit-exact:
//!
//! | Tag | Variant | Payload |
//! |-----|---------|---------|
//! | 0 | `Account` | tagged public key (`alg:u8 ++ key bytes`) |
//! | 1 | `Hash` | 32 raw bytes |
//! | 2 | `URef` | 32 address bytes ++ 1 access-rights byte |
//!
//! Equality, ordering and hashing are derived from the variant and payload,
//! so they agree with byte equality of the serialized form.

use crate::errors::ParseError;
use crate::identity::{AlgorithmTag, PublicKey};
use crate::uref::{AccessRights, URef, UREF_SERIALIZED_LENGTH};
use crate::{Hash, HASH_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_TAG_ACCOUNT: u8 = 0;
pub const KEY_TAG_HASH: u8 = 1;
pub const KEY_TAG_UREF: u8 = 2;

const ACCOUNT_PREFIX: &str = "account-";
const HASH_PREFIX: &str = "hash-";
const UREF_PREFIX: &str = "uref-";

/// A global-state key.
#[derive(Clone, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    /// An account, identified by its public key.
    Account(PublicKey),
    /// A content-addressed location (contract, stored value).
    Hash(Hash),
    /// An unforgeable reference.
    URef(URef),
}

impl Key {
    pub fn from_account(public_key: PublicKey) -> Self {
        Key::Account(public_key)
    }

    pub fn from_hash(hash: Hash) -> Self {
        Key::Hash(hash)
    }

    pub fn from_uref(uref: URef) -> Self {
        Key::URef(uref)
    }

    pub fn tag(&self) -> u8 {
        match self {
            Key::Account(_) => KEY_TAG_ACCOUNT,
            Key::Hash(_) => KEY_TAG_HASH,
            Key::URef(_) => KEY_TAG_UREF,
        }
    }

    pub fn serialized_length(&self) -> usize {
        1 + match self {
            Key::Account(public_key) => public_key.serialized_length(),
            Key::Hash(_) => HASH_LENGTH,
            Key::URef(_) => UREF_SERIALIZED_LENGTH,
        }
    }

    /// Encode as `tag ++ payload`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_length());
        out.push(self.tag());
        match self {
            Key::Account(public_key) => public_key.write_bytes(&mut out),
            Key::Hash(hash) => out.extend_from_slice(hash),
            Key::URef(uref) => uref.write_bytes(&mut out),
        }
        out
    }

    /// Decode a key from the front of `bytes`, returning the remaining input.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        let (&tag, payload) = bytes.split_first().ok_or(ParseError::TruncatedInput {
            expected: 1,
            actual: 0,
        })?;
        match tag {
            KEY_TAG_ACCOUNT => {
                let (public_key, rest) = PublicKey::from_bytes(payload).map_err(|err| match err {
                    ParseError::TruncatedInput { expected, actual } => {
                        ParseError::TruncatedInput {
                            expected: expected + 1,
                            actual: actual + 1,
                        }
                    }
                    other => other,
                })?;
                Ok((Key::Account(public_key), rest))
            }
            KEY_TAG_HASH => {
                if payload.len() < HASH_LENGTH {
                    return Err(ParseError::TruncatedInput {
                        expected: 1 + HASH_LENGTH,
                        actual: bytes.len(),
                    });
                }
                let (body, rest) = payload.split_at(HASH_LENGTH);
                let mut hash = [0u8; HASH_LENGTH];
                hash.copy_from_slice(body);
                Ok((Key::Hash(hash), rest))
            }
            KEY_TAG_UREF => {
                if payload.len() < UREF_SERIALIZED_LENGTH {
                    return Err(ParseError::TruncatedInput {
                        expected: 1 + UREF_SERIALIZED_LENGTH,
                        actual: bytes.len(),
                    });
                }
                let (uref, rest) = URef::from_bytes(payload)?;
                Ok((Key::URef(uref), rest))
            }
            unknown => Err(ParseError::UnknownVariant(unknown)),
        }
    }

    /// Decode exactly one key; trailing input is an error.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let (key, rest) = Self::from_bytes(bytes)?;
        if !rest.is_empty() {
            return Err(ParseError::TrailingBytes(rest.len()));
        }
        Ok(key)
    }

    /// Parse the [`Display`](fmt::Display) form back into a key.
    pub fn from_formatted_str(input: &str) -> Result<Self, ParseError> {
        if let Some(rest) = input.strip_prefix(ACCOUNT_PREFIX) {
            let (name, hex_part) = rest
                .rsplit_once('-')
                .ok_or_else(|| ParseError::InvalidFormat(input.to_string()))?;
            let algorithm = AlgorithmTag::from_name(name)
                .ok_or_else(|| ParseError::InvalidFormat(format!("unknown algorithm {name}")))?;
            return Ok(Key::Account(PublicKey::new(algorithm, decode_hex(hex_part)?)?));
        }
        if let Some(rest) = input.strip_prefix(HASH_PREFIX) {
            return Ok(Key::Hash(decode_hash(rest)?));
        }
        if let Some(rest) = input.strip_prefix(UREF_PREFIX) {
            let (addr, rights) = rest
                .rsplit_once('-')
                .ok_or_else(|| ParseError::InvalidFormat(input.to_string()))?;
            let bits = u8::from_str_radix(rights, 8)
                .map_err(|_| ParseError::InvalidFormat(format!("access rights {rights}")))?;
            let access_rights = AccessRights::from_bits(bits)
                .ok_or_else(|| ParseError::InvalidFormat(format!("access rights {rights}")))?;
            return Ok(Key::URef(URef::new(decode_hash(addr)?, access_rights)));
        }
        Err(ParseError::InvalidFormat(input.to_string()))
    }

    /// Build a key from a query-style key kind and base16 payload.
    ///
    /// Kinds: `address`/`account` (raw public key, algorithm chosen by length),
    /// `hash` (32 bytes) and `uref` (32 bytes with full rights, or 33 bytes
    /// with an explicit rights byte).
    pub fn from_variant_and_base16(kind: &str, base16: &str) -> Result<Self, ParseError> {
        let bytes = decode_hex(base16)?;
        match kind.to_ascii_lowercase().as_str() {
            "address" | "account" => {
                let algorithm = AlgorithmTag::ALL
                    .into_iter()
                    .find(|tag| tag.public_key_length() == bytes.len())
                    .ok_or_else(|| {
                        ParseError::InvalidFormat(format!(
                            "no algorithm has {}-byte public keys",
                            bytes.len()
                        ))
                    })?;
                Ok(Key::Account(PublicKey::new(algorithm, bytes)?))
            }
            "hash" => Ok(Key::Hash(to_hash(&bytes)?)),
            "uref" if bytes.len() == HASH_LENGTH => Ok(Key::URef(URef::new(
                to_hash(&bytes)?,
                AccessRights::READ_ADD_WRITE,
            ))),
            "uref" => {
                let (uref, rest) = URef::from_bytes(&bytes)?;
                if !rest.is_empty() {
                    return Err(ParseError::TrailingBytes(rest.len()));
                }
                Ok(Key::URef(uref))
            }
            other => Err(ParseError::InvalidFormat(format!("unknown key kind {other}"))),
        }
    }

    pub fn as_account(&self) -> Option<&PublicKey> {
        match self {
            Key::Account(public_key) => Some(public_key),
            _ => None,
        }
    }

    pub fn as_uref(&self) -> Option<&URef> {
        match self {
            Key::URef(uref) => Some(uref),
            _ => None,
        }
    }
}

fn decode_hex(input: &str) -> Result<Vec<u8>, ParseError> {
    hex::decode(input).map_err(|err| ParseError::InvalidFormat(format!("hex: {err}")))
}

fn to_hash(bytes: &[u8]) -> Result<Hash, ParseError> {
    <Hash>::try_from(bytes).map_err(|_| ParseError::InvalidLength {
        algorithm: "hash",
        expected: HASH_LENGTH,
        actual: bytes.len(),
    })
}

fn decode_hash(input: &str) -> Result<Hash, ParseError> {
    to_hash(&decode_hex(input)?)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Account(public_key) => write!(f, "{ACCOUNT_PREFIX}{public_key}"),
            Key::Hash(hash) => write!(f, "{HASH_PREFIX}{}", hex::encode(hash)),
            Key::URef(uref) => write!(f, "{uref}"),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key::{self}")
    }
}

impl From<URef> for Key {
    fn from(uref: URef) -> Self {
        Key::URef(uref)
    }
}

impl From<PublicKey> for Key {
    fn from(public_key: PublicKey) -> Self {
        Key::Account(public_key)
    }
}
