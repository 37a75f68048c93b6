//! # Error Types
//!
//! Errors raised while decoding or combining global-state values.

use thiserror::Error;

/// Errors raised when decoding a key, public key or signature.
///
/// Always recoverable: the caller rejects the single malformed item.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer bytes than the variant requires.
    #[error("Truncated input: expected {expected} bytes, got {actual}")]
    TruncatedInput { expected: usize, actual: usize },

    /// Key tag byte is not one of the known variants.
    #[error("Unknown key variant tag: {0}")]
    UnknownVariant(u8),

    /// Algorithm tag byte is not one of the known signature algorithms.
    #[error("Unknown algorithm tag: {0}")]
    UnknownAlgorithm(u8),

    /// Input continues after a complete value.
    #[error("Trailing bytes after value: {0}")]
    TrailingBytes(usize),

    /// Payload length does not match the algorithm's fixed length.
    #[error("Invalid length for {algorithm}: expected {expected}, got {actual}")]
    InvalidLength {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Structurally invalid content (bad hex, unknown access bits, ...).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Errors raised when composing two transforms on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// The two transforms add different numeric or collection kinds.
    #[error("Transform type mismatch: cannot compose {left} with {right}")]
    TypeMismatch {
        left: &'static str,
        right: &'static str,
    },

    /// An add applied on top of an opaque written value.
    #[error("Cannot compose {next} onto an opaque write")]
    NonCommutative { next: &'static str },
}
