//! Claims ledger integration layer
//!
//! This module defines the contract surface the client talks to, the claim
//! records it returns, the signed transaction envelope, and a local ledger
//! instance persisted in SQLite.

pub mod client;
pub mod deploy;
pub mod signer;
pub mod sqlite;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::claims::EncodedSubmission;
use crate::types::{keccak256, Address, TxHash};

// Re-exports
pub use client::{ClientError, LedgerClient, PendingSubmission};
pub use deploy::{deploy, load_deployment, DeployError, DeploymentInfo, CONTRACT_NAME};
pub use signer::{Signer, SignerError};
pub use sqlite::{RecordedFields, SqliteLedger};

/// Sequential claim identifier assigned by the ledger (first claim is 1)
pub type ClaimId = u64;

/// Public metadata of a recorded claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id: ClaimId,
    pub claimant: Address,

    /// Unix timestamp (seconds) when the ledger recorded the claim
    pub submission_time: u64,

    pub is_processed: bool,
    pub is_approved: bool,

    /// Amount disclosed by the ledger owner on processing (0 until then)
    pub public_amount: u128,
}

impl Claim {
    pub fn status(&self) -> ClaimStatus {
        match (self.is_processed, self.is_approved) {
            (false, _) => ClaimStatus::Pending,
            (true, true) => ClaimStatus::Approved,
            (true, false) => ClaimStatus::Rejected,
        }
    }
}

/// Lifecycle status derived from the processed/approved flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Aggregate counters kept by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContractStats {
    pub total_claims: u64,
    pub processed_claims: u64,
    pub approved_claims: u64,
}

/// Payload of a submit-claim transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitClaim {
    pub submission: EncodedSubmission,

    /// Random value making every submission a distinct transaction
    pub nonce: u64,
}

/// Payload of an owner-only processing transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessClaim {
    pub claim_id: ClaimId,
    pub approved: bool,
    pub public_amount: u128,
    pub nonce: u64,
}

/// A payload together with the secp256k1 signature of its sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signed<T> {
    pub payload: T,

    /// Compressed public key of the sender (hex)
    pub public_key: String,

    /// Compact ECDSA signature over [`Signed::digest`] (hex)
    pub signature: String,
}

impl<T: Serialize> Signed<T> {
    /// keccak256 of the payload's canonical JSON encoding
    pub fn digest(payload: &T) -> Result<[u8; 32], LedgerError> {
        Ok(keccak256(&serde_json::to_vec(payload)?))
    }

    /// Transaction hash: keccak256(digest || signature)
    pub fn tx_hash(&self) -> Result<TxHash, LedgerError> {
        let signature = hex::decode(&self.signature).map_err(invalid_signature)?;
        let mut preimage = Self::digest(&self.payload)?.to_vec();
        preimage.extend_from_slice(&signature);
        Ok(TxHash(keccak256(&preimage)))
    }

    /// Check the signature and return the sender's address
    pub fn verify(&self) -> Result<Address, LedgerError> {
        let key_bytes = hex::decode(&self.public_key).map_err(invalid_signature)?;
        let public_key =
            secp256k1::PublicKey::from_slice(&key_bytes).map_err(invalid_signature)?;
        let sig_bytes = hex::decode(&self.signature).map_err(invalid_signature)?;
        let signature =
            secp256k1::ecdsa::Signature::from_compact(&sig_bytes).map_err(invalid_signature)?;
        let message = secp256k1::Message::from_digest_slice(&Self::digest(&self.payload)?)
            .map_err(invalid_signature)?;

        secp256k1::Secp256k1::verification_only()
            .verify_ecdsa(&message, &signature, &public_key)
            .map_err(invalid_signature)?;

        Ok(Address::from_public_key(&public_key))
    }
}

fn invalid_signature(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::InvalidSignature(e.to_string())
}

/// Ledger errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Claim not found: {0}")]
    ClaimNotFound(ClaimId),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Transaction already recorded: {0}")]
    DuplicateTransaction(String),

    #[error("Caller {0} is not the ledger owner")]
    Unauthorized(Address),

    #[error("Claim {0} has already been processed")]
    AlreadyProcessed(ClaimId),

    #[error("Ledger already exists at {0}")]
    AlreadyDeployed(PathBuf),

    #[error("No ledger deployed at {0}")]
    NotDeployed(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl LedgerError {
    /// Whether the ledger refused the call (as opposed to failing to serve it)
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidSignature(_)
                | LedgerError::DuplicateTransaction(_)
                | LedgerError::Unauthorized(_)
                | LedgerError::AlreadyProcessed(_)
        )
    }
}

/// Read/write surface of the claims ledger contract
#[allow(async_fn_in_trait)]
pub trait ClaimsLedger {
    /// Record a signed claim; returns the identifier assigned to it
    async fn submit_encrypted_claim(&self, tx: &Signed<SubmitClaim>)
        -> Result<ClaimId, LedgerError>;

    async fn get_claim_metadata(&self, claim_id: ClaimId) -> Result<Claim, LedgerError>;

    /// Claim identifiers filed by `user`, in insertion order
    async fn get_user_claims(&self, user: &Address) -> Result<Vec<ClaimId>, LedgerError>;

    async fn get_contract_stats(&self) -> Result<ContractStats, LedgerError>;
}

impl<L: ClaimsLedger> ClaimsLedger for &L {
    async fn submit_encrypted_claim(
        &self,
        tx: &Signed<SubmitClaim>,
    ) -> Result<ClaimId, LedgerError> {
        (**self).submit_encrypted_claim(tx).await
    }

    async fn get_claim_metadata(&self, claim_id: ClaimId) -> Result<Claim, LedgerError> {
        (**self).get_claim_metadata(claim_id).await
    }

    async fn get_user_claims(&self, user: &Address) -> Result<Vec<ClaimId>, LedgerError> {
        (**self).get_user_claims(user).await
    }

    async fn get_contract_stats(&self) -> Result<ContractStats, LedgerError> {
        (**self).get_contract_stats().await
    }
}
