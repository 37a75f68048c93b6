//! # Key Properties
//!
//! Account keys built from real public keys of every curve.

use proptest::prelude::*;
use shared_crypto::{account_hash, account_hash_key, public_key_hash, by_tag};
use shared_types::{AccessRights, AlgorithmTag, Key, ParseError, PublicKey, URef};

fn account_keys() -> Vec<Key> {
    AlgorithmTag::ALL
        .into_iter()
        .map(|tag| Key::from_account(by_tag(tag).generate_key_pair().unwrap().1))
        .collect()
}

#[test]
fn test_account_keys_round_trip() {
    for key in account_keys() {
        assert_eq!(Key::parse(&key.to_bytes()).unwrap(), key);
        assert_eq!(Key::from_formatted_str(&key.to_string()).unwrap(), key);
        assert_eq!(key.to_bytes().len(), key.serialized_length());
    }
}

#[test]
fn test_account_keys_reject_truncation() {
    for key in account_keys() {
        let bytes = key.to_bytes();
        assert!(matches!(
            Key::parse(&bytes[..bytes.len() - 1]),
            Err(ParseError::TruncatedInput { .. })
        ));
    }
}

#[test]
fn test_account_hash_separates_curves() {
    let public = by_tag(AlgorithmTag::Ed25519).generate_key_pair().unwrap().1;
    let hash = account_hash(&public);
    assert_eq!(hash, public_key_hash("ed25519", public.as_bytes()));
    assert_ne!(hash, public_key_hash("secp256k1", public.as_bytes()));
    assert_eq!(account_hash_key(&public), Key::Hash(hash));
}

#[test]
fn test_query_style_parsing_matches_display() {
    let public = by_tag(AlgorithmTag::Secp256k1).generate_key_pair().unwrap().1;
    let from_query = Key::from_variant_and_base16("address", &hex::encode(public.as_bytes())).unwrap();
    assert_eq!(from_query, Key::from_account(public));

    let uref = Key::from_variant_and_base16("uref", &hex::encode([4u8; 32])).unwrap();
    assert_eq!(uref, Key::URef(URef::new([4; 32], AccessRights::READ_ADD_WRITE)));
}

proptest! {
    #[test]
    fn prop_ed25519_shaped_accounts_round_trip(raw in any::<[u8; 32]>()) {
        let key = Key::from_account(PublicKey::new(AlgorithmTag::Ed25519, raw.to_vec()).unwrap());
        prop_assert_eq!(Key::parse(&key.to_bytes()).unwrap(), key.clone());
        prop_assert_eq!(Key::from_formatted_str(&key.to_string()).unwrap(), key);
    }

    #[test]
    fn prop_uref_keys_round_trip(addr in any::<[u8; 32]>(), bits in 0u8..8) {
        let rights = AccessRights::from_bits(bits).unwrap();
        let key = Key::from_uref(URef::new(addr, rights));
        prop_assert_eq!(Key::parse(&key.to_bytes()).unwrap(), key.clone());
        prop_assert_eq!(Key::from_formatted_str(&key.to_string()).unwrap(), key);
    }
}
