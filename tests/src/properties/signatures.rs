//! # Signature Properties
//!
//! Every registered curve, driven through the registry the validation
//! pipeline uses.

use block_validation::{DeployError, DeployValidator, ValidationConfig};
use proptest::prelude::*;
use shared_crypto::{algorithms, by_name, verify_key_pair, verify_signature};
use shared_types::{AlgorithmTag, Approval, Deploy, DeployHeader, ExecutableItem, Signature};

fn signed_deploy(tag: AlgorithmTag) -> Deploy {
    let algorithm = shared_crypto::by_tag(tag);
    let (private, account) = algorithm.generate_key_pair().unwrap();
    let header = DeployHeader {
        account: account.clone(),
        timestamp: 500,
        ttl_ms: 1_000,
        gas_price: 1,
        gas_limit: 100,
        body_hash: [0; 32],
        chain_name: "dagchain".into(),
        dependencies: vec![],
    };
    let deploy = Deploy::new(
        header,
        ExecutableItem::Transfer,
        ExecutableItem::StoredContractByName("counter".into()),
    );
    let signature = algorithm.sign(&deploy.hash, &private).unwrap();
    deploy.with_approval(Approval {
        signer: account,
        signature,
    })
}

#[test]
fn test_deploys_signed_with_every_curve_validate() {
    let config = ValidationConfig::default();
    for tag in AlgorithmTag::ALL {
        let deploy = signed_deploy(tag);
        assert_eq!(DeployValidator::validate(&deploy, 1_000, &config), Ok(()), "{tag:?}");
    }
}

#[test]
fn test_signature_from_other_curve_never_verifies() {
    for signer in AlgorithmTag::ALL {
        let deploy = signed_deploy(signer);
        let signature = deploy.approvals[0].signature.clone();
        for verifier in AlgorithmTag::ALL.into_iter().filter(|t| *t != signer) {
            let (_, public) = shared_crypto::by_tag(verifier).generate_key_pair().unwrap();
            let verdict = verify_signature(&deploy.hash, &signature, &public);
            assert!(!verdict.unwrap_or(false), "{signer:?} signature under {verifier:?} key");
        }
    }
}

#[test]
fn test_expired_deploy_reported_with_times() {
    let deploy = signed_deploy(AlgorithmTag::Ed25519);
    assert!(matches!(
        DeployValidator::validate(&deploy, 5_000, &ValidationConfig::default()),
        Err(DeployError::Expired { block_timestamp: 5_000, .. })
    ));
}

#[test]
fn test_text_round_trip_for_every_curve() {
    for algorithm in algorithms() {
        let (private, public) = algorithm.generate_key_pair().unwrap();
        let hex_text = hex::encode(public.as_bytes());
        let parsed = algorithm.parse_public_key(&hex_text).unwrap();
        assert_eq!(parsed, public, "{}", algorithm.name());

        let private_text = format!("0x{}", hex::encode(private.as_bytes()));
        let parsed_private = by_name(algorithm.name())
            .unwrap()
            .parse_private_key(&private_text)
            .unwrap();
        assert!(verify_key_pair(algorithm, &parsed_private, &public));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_random_signature_bytes_never_panic(
        tag_index in 0usize..3,
        digest in any::<[u8; 32]>(),
        noise in proptest::collection::vec(any::<u8>(), 96),
    ) {
        let tag = AlgorithmTag::ALL[tag_index];
        let (_, public) = shared_crypto::by_tag(tag).generate_key_pair().unwrap();
        let signature = Signature::new(tag, noise[..tag.signature_length()].to_vec()).unwrap();
        let verdict = verify_signature(&digest, &signature, &public);
        prop_assert!(!verdict.unwrap_or(false));
    }
}
