//! Claim preparation
//!
//! Form validation, amount/type encoding and the placeholder obfuscation
//! applied before a claim is handed to the ledger client.

pub mod encoder;
pub mod form;
pub mod obfuscation;

// Re-exports
pub use encoder::{
    content_hash, format_amount, parse_amount, ClaimEncoder, ClaimInput, ClaimType, EncodeError,
    EncodeWarning, EncodedClaim, EncodedSubmission, DEFAULT_DECIMALS,
};
pub use form::{AttachmentDigest, ClaimForm, ClaimMetadata, FieldError, FormErrors};
pub use obfuscation::{obscure_value, peek_prefix, ObscuredCode};
