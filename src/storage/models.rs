//! Storage data models
//!
//! Signing identity records as persisted on disk and shown to the user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::Signer;
use crate::storage::keys::{decrypt_secret_key, encrypt_secret_key, KeyError};
use crate::types::Address;

/// Identity metadata (non-sensitive information)
///
/// Stored unencrypted for fast listing.
/// Saved to: `<data_dir>/identities/<name>/identity.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub name: String,
    pub address: Address,
    pub created_at: DateTime<Utc>,
}

impl IdentityMetadata {
    pub fn new(name: String, address: Address) -> Self {
        Self {
            name,
            address,
            created_at: Utc::now(),
        }
    }
}

/// Encrypted key material
///
/// Saved to: `<data_dir>/identities/<name>/keys.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedIdentityKeys {
    /// Compressed public key (hex, not encrypted)
    pub public_key: String,

    /// Secret key sealed with the identity password (hex)
    pub encrypted_secret_key: String,
}

impl EncryptedIdentityKeys {
    pub fn from_signer(signer: &Signer, password: &str) -> Result<Self, KeyError> {
        Ok(Self {
            public_key: hex::encode(signer.public_key().serialize()),
            encrypted_secret_key: encrypt_secret_key(signer.secret_key(), password)?,
        })
    }

    pub fn to_signer(&self, password: &str) -> Result<Signer, KeyError> {
        let secret_key = decrypt_secret_key(&self.encrypted_secret_key, password)?;
        Ok(Signer::from_secret_key(secret_key))
    }
}

/// User-facing identity information (returned on creation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub name: String,
    pub address: Address,
    pub public_key: String,
}

impl IdentityInfo {
    pub fn from_signer(name: String, signer: &Signer) -> Self {
        Self {
            name,
            address: signer.address(),
            public_key: hex::encode(signer.public_key().serialize()),
        }
    }
}
