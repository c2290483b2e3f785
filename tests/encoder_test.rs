//! Integration tests for claim encoding
//!
//! Covers amount scaling, the claim type lookup table and its fallback,
//! content hashing and the placeholder obfuscation.

use privacy_shield_claims::claims::{
    content_hash, format_amount, obscure_value, parse_amount, peek_prefix, ClaimEncoder,
    ClaimInput, ClaimType, EncodeError, EncodeWarning, DEFAULT_DECIMALS,
};
use privacy_shield_claims::types::keccak256;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn input(amount: &str, claim_type: &str, description: &str) -> ClaimInput {
    ClaimInput {
        amount: amount.to_string(),
        claim_type: claim_type.to_string(),
        description: description.to_string(),
        metadata: None,
    }
}

#[test]
fn test_medical_claim_scenario_encodes_amount_type_and_hash() {
    init_logging();

    let encoder = ClaimEncoder::default();
    let encoded = encoder
        .encode(&input("1200.50", "Medical", "Lost medication"))
        .expect("Encoding should succeed");

    // 1200.50 x 10^18
    let expected_amount = 1_200_500_000_000_000_000_000u128;
    assert_eq!(encoded.scaled_amount, expected_amount);
    assert_eq!(encoded.claim_type, ClaimType::Medical);
    assert!(encoded.warnings.is_empty(), "Known label should not warn");

    let submission = &encoded.submission;
    assert_eq!(submission.amount_code, obscure_value(expected_amount));
    assert_eq!(submission.type_code, obscure_value(1));
    assert_eq!(submission.content_hash, keccak256(b"Lost medication"));
    assert_eq!(submission.metadata, None);
}

#[test]
fn test_scaled_amounts_recover_the_entered_value() {
    for (entered, canonical) in [
        ("1200.50", "1200.5"),
        ("0.000000000000000001", "0.000000000000000001"),
        ("42", "42"),
        ("0", "0"),
        ("3.14159", "3.14159"),
    ] {
        let scaled = parse_amount(entered, DEFAULT_DECIMALS).unwrap();
        assert_eq!(
            format_amount(scaled, DEFAULT_DECIMALS),
            canonical,
            "Amount {} should survive scaling",
            entered
        );
    }
}

#[test]
fn test_extra_fraction_digits_are_truncated() {
    let scaled = parse_amount("1.239", 2).unwrap();
    assert_eq!(scaled, 123);
}

#[test]
fn test_invalid_amounts_are_rejected() {
    let encoder = ClaimEncoder::default();

    for bad in ["", "   ", "abc", "12.3.4", "-5", "1e3", "."] {
        let result = encoder.encode(&input(bad, "Medical", "Lost medication"));
        assert!(
            matches!(result, Err(EncodeError::InvalidAmount { .. })),
            "Amount {:?} should be rejected, got {:?}",
            bad,
            result.map(|e| e.scaled_amount)
        );
    }
}

#[test]
fn test_amount_overflowing_the_ledger_word_is_rejected() {
    let huge = "9".repeat(40);
    assert!(matches!(
        parse_amount(&huge, DEFAULT_DECIMALS),
        Err(EncodeError::InvalidAmount { .. })
    ));
}

#[test]
fn test_every_form_label_maps_to_a_category() {
    let expected = [
        ("Auto Collision", ClaimType::Liability),
        ("Home Water Damage", ClaimType::Property),
        ("Medical", ClaimType::Medical),
        ("Property Theft", ClaimType::Property),
        ("Fire Damage", ClaimType::Property),
        ("Natural Disaster", ClaimType::Property),
        ("Personal Injury", ClaimType::Medical),
        ("Other", ClaimType::Liability),
    ];

    assert_eq!(ClaimType::LABELS.len(), expected.len());
    for (label, claim_type) in expected {
        assert_eq!(ClaimType::lookup(label), Some(claim_type), "label {}", label);
    }
}

#[test]
fn test_unrecognized_label_falls_back_and_warns() {
    init_logging();

    let encoder = ClaimEncoder::default();
    let encoded = encoder
        .encode(&input("10", "Pet Insurance", "The cat ate my homework"))
        .expect("Unknown labels must never fail");

    assert_eq!(encoded.claim_type, ClaimType::FALLBACK);
    assert_eq!(
        encoded.submission.type_code,
        obscure_value(ClaimType::FALLBACK.code() as u128)
    );
    assert_eq!(
        encoded.warnings,
        vec![EncodeWarning::UnrecognizedClaimType {
            label: "Pet Insurance".to_string(),
            fallback: ClaimType::FALLBACK,
        }]
    );
}

#[test]
fn test_lookup_is_exact_match() {
    assert_eq!(ClaimType::lookup("medical"), None);
    assert_eq!(ClaimType::lookup(" Medical"), None);
}

#[test]
fn test_content_hash_is_keccak_of_description() {
    assert_eq!(content_hash(""), keccak256(b""));
    assert_ne!(content_hash("a"), content_hash("b"));
}

#[test]
fn test_obscured_codes_hide_small_values() {
    let code = obscure_value(1);
    assert_ne!(peek_prefix(&code), 1);
    assert_eq!(
        peek_prefix(&code),
        u32::from_be_bytes([code[0], code[1], code[2], code[3]])
    );
}

#[test]
fn test_encoder_precision_is_bounded() {
    assert!(ClaimEncoder::new(0).is_ok());
    assert!(ClaimEncoder::new(38).is_ok());
    assert!(matches!(
        ClaimEncoder::new(39),
        Err(EncodeError::UnsupportedPrecision(39))
    ));

    let cents = ClaimEncoder::new(2).unwrap();
    let encoded = cents.encode(&input("19.99", "Other", "Broken umbrella")).unwrap();
    assert_eq!(encoded.scaled_amount, 1999);
}
