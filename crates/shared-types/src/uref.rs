//! # Unforgeable References
//!
//! A [`URef`] is an address plus access-rights bits. Possessing one is the
//! capability to use it; the address alone is unguessable.

use crate::errors::ParseError;
use crate::{Hash, HASH_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialized length of a [`URef`]: address bytes plus one access-rights byte.
pub const UREF_SERIALIZED_LENGTH: usize = HASH_LENGTH + 1;

/// Access-rights bit set carried by a [`URef`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AccessRights(u8);

impl AccessRights {
    pub const NONE: AccessRights = AccessRights(0b000);
    pub const READ: AccessRights = AccessRights(0b001);
    pub const WRITE: AccessRights = AccessRights(0b010);
    pub const ADD: AccessRights = AccessRights(0b100);
    pub const READ_WRITE: AccessRights = AccessRights(0b011);
    pub const READ_ADD: AccessRights = AccessRights(0b101);
    pub const ADD_WRITE: AccessRights = AccessRights(0b110);
    pub const READ_ADD_WRITE: AccessRights = AccessRights(0b111);

    const ALL_BITS: u8 = 0b111;

    /// Decode an access-rights byte, rejecting unknown bits.
    pub fn from_bits(bits: u8) -> Option<Self> {
        (bits & !Self::ALL_BITS == 0).then_some(Self(bits))
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: AccessRights) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: AccessRights) -> Self {
        Self(self.0 | other.0)
    }
}

impl TryFrom<u8> for AccessRights {
    type Error = ParseError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| {
            ParseError::InvalidFormat(format!("unknown access rights bits {bits:#010b}"))
        })
    }
}

impl From<AccessRights> for u8 {
    fn from(rights: AccessRights) -> Self {
        rights.0
    }
}

/// Unforgeable reference to a global-state location.
#[derive(Clone, Copy, PartialEq, Eq, std::hash::Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct URef {
    addr: Hash,
    access_rights: AccessRights,
}

impl URef {
    pub fn new(addr: Hash, access_rights: AccessRights) -> Self {
        Self {
            addr,
            access_rights,
        }
    }

    pub fn addr(&self) -> Hash {
        self.addr
    }

    pub fn access_rights(&self) -> AccessRights {
        self.access_rights
    }

    /// Same address with the given rights.
    pub fn with_access_rights(self, access_rights: AccessRights) -> Self {
        Self {
            addr: self.addr,
            access_rights,
        }
    }

    /// Same address with no rights at all.
    pub fn remove_access_rights(self) -> Self {
        self.with_access_rights(AccessRights::NONE)
    }

    pub fn is_readable(&self) -> bool {
        self.access_rights.contains(AccessRights::READ)
    }

    pub fn is_writeable(&self) -> bool {
        self.access_rights.contains(AccessRights::WRITE)
    }

    pub fn is_addable(&self) -> bool {
        self.access_rights.contains(AccessRights::ADD)
    }

    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.addr);
        out.push(self.access_rights.bits());
    }

    /// Decode a URef from the front of `bytes`, returning the rest.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), ParseError> {
        if bytes.len() < UREF_SERIALIZED_LENGTH {
            return Err(ParseError::TruncatedInput {
                expected: UREF_SERIALIZED_LENGTH,
                actual: bytes.len(),
            });
        }
        let (body, rest) = bytes.split_at(UREF_SERIALIZED_LENGTH);
        let mut addr = [0u8; HASH_LENGTH];
        addr.copy_from_slice(&body[..HASH_LENGTH]);
        let bits = body[HASH_LENGTH];
        let access_rights = AccessRights::from_bits(bits)
            .ok_or_else(|| ParseError::InvalidFormat(format!("access rights 0b{bits:08b}")))?;
        Ok((Self::new(addr, access_rights), rest))
    }
}

impl fmt::Debug for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "URef({}, {:03o})", hex::encode(self.addr), self.access_rights.bits())
    }
}

impl fmt::Display for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uref-{}-{:03o}", hex::encode(self.addr), self.access_rights.bits())
    }
}
