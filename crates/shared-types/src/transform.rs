//! # Transforms
//!
//! An effect applied to the value stored at a [`Key`](crate::Key).
//!
//! ## Commutativity
//!
//! Two transforms on the same key commute only in these cases:
//!
//! - adds of the same numeric kind (wrapping arithmetic is associative)
//! - two `AddKeys` that never bind one name to different keys
//! - two byte-identical writes
//! - two reads (`Identity`)
//!
//! Every other pair is treated as a conflict.

use crate::errors::TransformError;
use crate::key::Key;
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transform {
    /// No-op; records that the key was read.
    #[default]
    Identity,
    /// Replace the stored value with opaque bytes.
    Write(Vec<u8>),
    AddInt32(i32),
    AddUInt64(u64),
    AddUInt256(U256),
    AddUInt512(U512),
    /// Insert named keys into a named-key collection.
    AddKeys(BTreeMap<String, Key>),
}

impl Transform {
    pub fn kind(&self) -> &'static str {
        match self {
            Transform::Identity => "Identity",
            Transform::Write(_) => "Write",
            Transform::AddInt32(_) => "AddInt32",
            Transform::AddUInt64(_) => "AddUInt64",
            Transform::AddUInt256(_) => "AddUInt256",
            Transform::AddUInt512(_) => "AddUInt512",
            Transform::AddKeys(_) => "AddKeys",
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(
            self,
            Transform::AddInt32(_)
                | Transform::AddUInt64(_)
                | Transform::AddUInt256(_)
                | Transform::AddUInt512(_)
                | Transform::AddKeys(_)
        )
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Transform::Write(_))
    }

    fn tag(&self) -> u8 {
        match self {
            Transform::Identity => 0,
            Transform::Write(_) => 1,
            Transform::AddInt32(_) => 2,
            Transform::AddUInt64(_) => 3,
            Transform::AddUInt256(_) => 4,
            Transform::AddUInt512(_) => 5,
            Transform::AddKeys(_) => 6,
        }
    }

    /// Append a canonical `tag ++ payload` encoding to `out`, used when
    /// hashing blocks. Lengths are little-endian `u32`.
    pub fn write_bytes(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            Transform::Identity => {}
            Transform::Write(bytes) => write_len_prefixed(out, bytes),
            Transform::AddInt32(v) => out.extend_from_slice(&v.to_le_bytes()),
            Transform::AddUInt64(v) => out.extend_from_slice(&v.to_le_bytes()),
            Transform::AddUInt256(v) => {
                let mut buf = [0u8; 32];
                v.to_little_endian(&mut buf);
                out.extend_from_slice(&buf);
            }
            Transform::AddUInt512(v) => {
                let mut buf = [0u8; 64];
                v.to_little_endian(&mut buf);
                out.extend_from_slice(&buf);
            }
            Transform::AddKeys(named) => {
                out.extend_from_slice(&(named.len() as u32).to_le_bytes());
                for (name, key) in named {
                    write_len_prefixed(out, name.as_bytes());
                    out.extend_from_slice(&key.to_bytes());
                }
            }
        }
    }

    /// Whether applying `self` and `other` in either order yields the same value.
    pub fn commutes_with(&self, other: &Transform) -> bool {
        use Transform::*;
        match (self, other) {
            (Identity, Identity) => true,
            (Write(a), Write(b)) => a == b,
            (AddInt32(_), AddInt32(_))
            | (AddUInt64(_), AddUInt64(_))
            | (AddUInt256(_), AddUInt256(_))
            | (AddUInt512(_), AddUInt512(_)) => true,
            (AddKeys(a), AddKeys(b)) => a
                .iter()
                .all(|(name, key)| b.get(name).map_or(true, |other| other == key)),
            _ => false,
        }
    }

    /// The single transform equivalent to applying `self` then `next`.
    pub fn compose(self, next: Transform) -> Result<Transform, TransformError> {
        use Transform::*;
        match (self, next) {
            (Identity, next) => Ok(next),
            (current, Identity) => Ok(current),
            (_, Write(bytes)) => Ok(Write(bytes)),
            (Write(_), next) => Err(TransformError::NonCommutative { next: next.kind() }),
            (AddInt32(a), AddInt32(b)) => Ok(AddInt32(a.wrapping_add(b))),
            (AddUInt64(a), AddUInt64(b)) => Ok(AddUInt64(a.wrapping_add(b))),
            (AddUInt256(a), AddUInt256(b)) => Ok(AddUInt256(a.overflowing_add(b).0)),
            (AddUInt512(a), AddUInt512(b)) => Ok(AddUInt512(a.overflowing_add(b).0)),
            (AddKeys(mut a), AddKeys(b)) => {
                a.extend(b);
                Ok(AddKeys(a))
            }
            (current, next) => Err(TransformError::TypeMismatch {
                left: current.kind(),
                right: next.kind(),
            }),
        }
    }
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}
