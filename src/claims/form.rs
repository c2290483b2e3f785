//! Claim form validation
//!
//! Validates the fields a user enters for a new claim and converts encoding
//! failures into field-level messages. Builds the optional metadata blob
//! (incident date and attachment digests) that travels with a submission.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::claims::encoder::{ClaimEncoder, ClaimInput, EncodeError, EncodedClaim};

/// Minimum description length accepted by the form
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// A validation message attached to a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// All field-level errors found in a form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormErrors(pub Vec<FieldError>);

impl FormErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First message recorded for `field`, if any
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

/// Digest of a supporting document; the file itself stays local
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDigest {
    pub name: String,
    pub size: u64,
    pub sha256: String,
}

/// Opaque metadata carried with a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimMetadata {
    pub incident_date: NaiveDate,
    pub attachments: Vec<AttachmentDigest>,
}

impl ClaimMetadata {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Fields entered on the new-claim form
#[derive(Debug, Clone, Default)]
pub struct ClaimForm {
    pub claim_type: String,
    pub amount: String,
    pub description: String,
    pub incident_date: String,
    pub attachments: Vec<PathBuf>,
}

impl ClaimForm {
    /// Check required fields without touching the file system
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.claim_type.trim().is_empty() {
            errors.push("claim_type", "Please select a claim type");
        }
        if self.amount.trim().is_empty() {
            errors.push("amount", "Amount is required");
        }
        if self.description.chars().count() < MIN_DESCRIPTION_CHARS {
            errors.push(
                "description",
                format!(
                    "Description must be at least {} characters",
                    MIN_DESCRIPTION_CHARS
                ),
            );
        }
        if self.incident_date.trim().is_empty() {
            errors.push("incident_date", "Incident date is required");
        } else if parse_incident_date(&self.incident_date).is_none() {
            errors.push(
                "incident_date",
                "Incident date must be formatted as YYYY-MM-DD",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, digest attachments and encode the claim
    ///
    /// Encoding failures are reported as errors on the `amount` field.
    pub fn prepare(&self, encoder: &ClaimEncoder) -> Result<EncodedClaim, FormErrors> {
        self.validate()?;

        let mut errors = FormErrors::default();
        let mut attachments = Vec::with_capacity(self.attachments.len());
        for path in &self.attachments {
            match digest_attachment(path) {
                Ok(digest) => attachments.push(digest),
                Err(e) => errors.push(
                    "attachments",
                    format!("Cannot read {}: {}", path.display(), e),
                ),
            }
        }

        // validate() already checked the date
        let incident_date = match parse_incident_date(&self.incident_date) {
            Some(date) => date,
            None => {
                errors.push("incident_date", "Incident date is required");
                return Err(errors);
            }
        };

        let metadata = ClaimMetadata {
            incident_date,
            attachments,
        };
        let metadata = match metadata.to_bytes() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                errors.push("attachments", format!("Cannot encode metadata: {}", e));
                None
            }
        };

        let input = ClaimInput {
            amount: self.amount.clone(),
            claim_type: self.claim_type.clone(),
            description: self.description.clone(),
            metadata,
        };

        let encoded = match encoder.encode(&input) {
            Ok(encoded) => Some(encoded),
            Err(EncodeError::InvalidAmount { reason, .. }) => {
                errors.push("amount", format!("Invalid amount: {}", reason));
                None
            }
            Err(e) => {
                errors.push("amount", e.to_string());
                None
            }
        };

        match encoded {
            Some(encoded) if errors.is_empty() => Ok(encoded),
            _ => Err(errors),
        }
    }
}

fn parse_incident_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn digest_attachment(path: &std::path::Path) -> std::io::Result<AttachmentDigest> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(AttachmentDigest {
        name,
        size: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(&bytes)),
    })
}
