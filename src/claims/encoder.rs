//! Claim encoding
//!
//! Turns user-entered claim fields into the tuple submitted to the ledger:
//! an obscured amount code, an obscured type code, the keccak256 content hash
//! of the description and optional metadata bytes.

use serde::{Deserialize, Serialize};

use crate::claims::obfuscation::{obscure_value, ObscuredCode};
use crate::types::keccak256;

/// Default number of decimals in the ledger's smallest amount unit
pub const DEFAULT_DECIMALS: u32 = 18;

/// Largest supported unit precision (10^38 still fits in u128)
pub const MAX_DECIMALS: u32 = 38;

/// Encoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    #[error("Unsupported unit precision: {0} decimals (maximum 38)")]
    UnsupportedPrecision(u32),
}

impl EncodeError {
    fn invalid_amount(input: &str, reason: &str) -> Self {
        EncodeError::InvalidAmount {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Claim category understood by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimType {
    Medical = 1,
    Property = 2,
    Liability = 3,
}

impl ClaimType {
    /// Code used when a label is not in the lookup table
    pub const FALLBACK: ClaimType = ClaimType::Liability;

    /// Labels offered by the claim form, in display order
    pub const LABELS: [&'static str; 8] = [
        "Auto Collision",
        "Home Water Damage",
        "Medical",
        "Property Theft",
        "Fire Damage",
        "Natural Disaster",
        "Personal Injury",
        "Other",
    ];

    pub const ALL: [ClaimType; 3] = [ClaimType::Medical, ClaimType::Property, ClaimType::Liability];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Recover the category behind a recorded type code by trying each one
    pub fn from_type_code(type_code: &ObscuredCode) -> Option<ClaimType> {
        Self::ALL
            .into_iter()
            .find(|claim_type| obscure_value(claim_type.code() as u128) == *type_code)
    }

    /// Exact-match lookup of a form label
    pub fn lookup(label: &str) -> Option<ClaimType> {
        match label {
            "Auto Collision" => Some(ClaimType::Liability),
            "Home Water Damage" => Some(ClaimType::Property),
            "Medical" => Some(ClaimType::Medical),
            "Property Theft" => Some(ClaimType::Property),
            "Fire Damage" => Some(ClaimType::Property),
            "Natural Disaster" => Some(ClaimType::Property),
            "Personal Injury" => Some(ClaimType::Medical),
            "Other" => Some(ClaimType::Liability),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimType::Medical => write!(f, "Medical"),
            ClaimType::Property => write!(f, "Property"),
            ClaimType::Liability => write!(f, "Liability"),
        }
    }
}

/// Non-fatal findings reported alongside an encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    /// Label missing from the lookup table; the fallback code was used
    UnrecognizedClaimType { label: String, fallback: ClaimType },
}

impl std::fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeWarning::UnrecognizedClaimType { label, fallback } => write!(
                f,
                "Unrecognized claim type '{}', filed as {}",
                label, fallback
            ),
        }
    }
}

/// Raw claim fields as entered by the user
#[derive(Debug, Clone)]
pub struct ClaimInput {
    pub amount: String,
    pub claim_type: String,
    pub description: String,
    pub metadata: Option<Vec<u8>>,
}

/// Tuple sent to the ledger's submit-claim call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSubmission {
    pub amount_code: ObscuredCode,
    pub type_code: ObscuredCode,
    pub content_hash: [u8; 32],
    pub metadata: Option<Vec<u8>>,
}

/// Result of encoding a claim
#[derive(Debug, Clone)]
pub struct EncodedClaim {
    pub submission: EncodedSubmission,

    /// Amount in the ledger's smallest unit
    pub scaled_amount: u128,

    pub claim_type: ClaimType,

    pub warnings: Vec<EncodeWarning>,
}

/// Encodes claims for a ledger with a fixed unit precision
#[derive(Debug, Clone, Copy)]
pub struct ClaimEncoder {
    decimals: u32,
}

impl Default for ClaimEncoder {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
        }
    }
}

impl ClaimEncoder {
    pub fn new(decimals: u32) -> Result<Self, EncodeError> {
        if decimals > MAX_DECIMALS {
            return Err(EncodeError::UnsupportedPrecision(decimals));
        }
        Ok(Self { decimals })
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Encode a claim into its submission tuple
    ///
    /// Unrecognized claim types never fail: they are filed under
    /// [`ClaimType::FALLBACK`], logged, and reported in `warnings`.
    pub fn encode(&self, input: &ClaimInput) -> Result<EncodedClaim, EncodeError> {
        let scaled_amount = parse_amount(&input.amount, self.decimals)?;

        let mut warnings = Vec::new();
        let claim_type = match ClaimType::lookup(&input.claim_type) {
            Some(claim_type) => claim_type,
            None => {
                log::warn!(
                    "Claim type '{}' not in lookup table, falling back to {}",
                    input.claim_type,
                    ClaimType::FALLBACK
                );
                warnings.push(EncodeWarning::UnrecognizedClaimType {
                    label: input.claim_type.clone(),
                    fallback: ClaimType::FALLBACK,
                });
                ClaimType::FALLBACK
            }
        };

        let submission = EncodedSubmission {
            amount_code: obscure_value(scaled_amount),
            type_code: obscure_value(claim_type.code() as u128),
            content_hash: content_hash(&input.description),
            metadata: input.metadata.clone(),
        };

        log::debug!(
            "Encoded claim: type={} content_hash=0x{}",
            claim_type,
            hex::encode(submission.content_hash)
        );

        Ok(EncodedClaim {
            submission,
            scaled_amount,
            claim_type,
            warnings,
        })
    }
}

/// keccak256 of the description's UTF-8 bytes
pub fn content_hash(description: &str) -> [u8; 32] {
    keccak256(description.as_bytes())
}

/// Parse a decimal string into the ledger's smallest unit
///
/// Fraction digits beyond `decimals` are truncated.
pub fn parse_amount(input: &str, decimals: u32) -> Result<u128, EncodeError> {
    if decimals > MAX_DECIMALS {
        return Err(EncodeError::UnsupportedPrecision(decimals));
    }

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(EncodeError::invalid_amount(input, "empty"));
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(EncodeError::invalid_amount(input, "no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(EncodeError::invalid_amount(
            input,
            "only digits and a single decimal point are allowed",
        ));
    }

    let unit = 10u128.pow(decimals);
    let overflow = || EncodeError::invalid_amount(input, "amount too large");

    let mut whole_value: u128 = 0;
    for digit in whole.bytes() {
        whole_value = whole_value
            .checked_mul(10)
            .and_then(|v| v.checked_add((digit - b'0') as u128))
            .ok_or_else(overflow)?;
    }

    let kept = &fraction[..fraction.len().min(decimals as usize)];
    let mut fraction_value: u128 = 0;
    for digit in kept.bytes() {
        fraction_value = fraction_value * 10 + (digit - b'0') as u128;
    }
    fraction_value *= 10u128.pow(decimals - kept.len() as u32);

    whole_value
        .checked_mul(unit)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(overflow)
}

/// Render a scaled amount as a canonical decimal string
pub fn format_amount(scaled: u128, decimals: u32) -> String {
    if decimals == 0 {
        return scaled.to_string();
    }

    let unit = 10u128.pow(decimals.min(MAX_DECIMALS));
    let whole = scaled / unit;
    let fraction = scaled % unit;
    if fraction == 0 {
        return whole.to_string();
    }

    let padded = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, padded.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_code_identifies_category() {
        for claim_type in ClaimType::ALL {
            let code = obscure_value(claim_type.code() as u128);
            assert_eq!(ClaimType::from_type_code(&code), Some(claim_type));
        }
        assert_eq!(ClaimType::from_type_code(&[0u8; 32]), None);
    }

    #[test]
    fn parse_amount_scales_to_smallest_unit() {
        assert_eq!(parse_amount("1", 2).unwrap(), 100);
        assert_eq!(parse_amount("1.5", 2).unwrap(), 150);
        assert_eq!(parse_amount(".25", 2).unwrap(), 25);
        assert_eq!(parse_amount("3.", 2).unwrap(), 300);
        assert_eq!(parse_amount(" 7 ", 0).unwrap(), 7);
    }

    #[test]
    fn parse_amount_truncates_excess_precision() {
        assert_eq!(parse_amount("0.129", 2).unwrap(), 12);
    }

    #[test]
    fn parse_amount_rejects_malformed_input() {
        for input in ["", " ", ".", "-1", "+1", "1e5", "1,200.50", "1.2.3", "abc", "0x10"] {
            assert!(
                matches!(parse_amount(input, 18), Err(EncodeError::InvalidAmount { .. })),
                "expected InvalidAmount for {:?}",
                input
            );
        }
    }

    #[test]
    fn parse_amount_rejects_overflow() {
        let huge = "1".repeat(40);
        assert!(matches!(
            parse_amount(&huge, 18),
            Err(EncodeError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn format_amount_trims_trailing_zeros() {
        assert_eq!(format_amount(150, 2), "1.5");
        assert_eq!(format_amount(100, 2), "1");
        assert_eq!(format_amount(5, 3), "0.005");
        assert_eq!(format_amount(0, 18), "0");
    }

    #[test]
    fn encoder_rejects_excessive_precision() {
        assert_eq!(
            ClaimEncoder::new(39).unwrap_err(),
            EncodeError::UnsupportedPrecision(39)
        );
    }
}
