//! # Shared Types Crate
//!
//! The global-state addressing model and the block entities shared by the
//! merge engine and the validation pipeline.
//!
//! ## Design Principles
//!
//! - **Keys are values**: a [`Key`] is an immutable tagged union. Two keys are
//!   equal only when their variants and payloads match byte-for-byte.
//! - **Bit-exact wire form**: `tag:u8 ++ payload`, produced by [`Key::to_bytes`]
//!   and consumed by [`Key::parse`], which rejects truncated and unknown input.
//! - **Untrusted identities**: a [`PublicKey`] built from raw bytes carries only
//!   a length check. Curve validity is the concern of `shared-crypto`.

pub mod block;
pub mod errors;
pub mod identity;
pub mod key;
pub mod transform;
pub mod uref;

pub use block::*;
pub use errors::*;
pub use identity::*;
pub use key::*;
pub use transform::*;
pub use uref::*;

/// A 32-byte hash (BLAKE3 digest, state root, block or deploy hash).
pub type Hash = [u8; 32];

/// Length of a [`Hash`] in bytes.
pub const HASH_LENGTH: usize = 32;

/// BLAKE3 over `data`, as a [`Hash`].
pub fn blake3_hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}
