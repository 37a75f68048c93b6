//! # Shared Crypto - Signature Algorithms
//!
//! ## Components
//!
//! | Module | Algorithm | Public key | Signature |
//! |--------|-----------|------------|-----------|
//! | `ed25519` | Ed25519 | 32 | 64 |
//! | `secp256k1` | ECDSA secp256k1 | 33 (compressed) | 64 (r‖s) |
//! | `bls` | BLS12-381 min-pk | 48 | 96 |
//!
//! Every algorithm implements [`SignatureAlgorithm`] and is reached through
//! the immutable [`registry`]. Key text is decoded by [`encoding`].
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization
//! - **BLS12-381**: Subgroup checks on keys and signatures
//! - **Private keys**: zeroized on drop, redacted in `Debug`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod account;
pub mod algorithm;
pub mod bls;
pub mod ed25519;
pub mod encoding;
pub mod errors;
pub mod keys;
pub mod registry;
pub mod secp256k1;

// Re-exports
pub use account::{account_hash, account_hash_key, public_key_hash};
pub use algorithm::{verify_key_pair, Digest, SignatureAlgorithm};
pub use bls::Bls12381;
pub use ed25519::Ed25519;
pub use errors::CryptoError;
pub use keys::PrivateKey;
pub use registry::{algorithms, by_name, by_tag, verify_signature};
pub use secp256k1::Secp256k1;
