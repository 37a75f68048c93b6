//! Account identity derived from public keys.

use shared_types::{blake3_hash, Hash, Key, PublicKey};

/// BLAKE3 over `name ++ 0x00 ++ public_key`.
///
/// The algorithm name is part of the input, so equal raw bytes under two
/// curve families hash differently.
pub fn public_key_hash(algorithm_name: &str, public_key: &[u8]) -> Hash {
    let mut input = Vec::with_capacity(algorithm_name.len() + 1 + public_key.len());
    input.extend_from_slice(algorithm_name.as_bytes());
    input.push(0);
    input.extend_from_slice(public_key);
    blake3_hash(&input)
}

/// Account hash of a tagged public key.
pub fn account_hash(public_key: &PublicKey) -> Hash {
    public_key_hash(public_key.algorithm().name(), public_key.as_bytes())
}

/// Canonical global-state key of the account.
pub fn account_hash_key(public_key: &PublicKey) -> Key {
    Key::Hash(account_hash(public_key))
}
