//! Ledger client
//!
//! Wraps the claims ledger's read and write calls. Writes are signed with
//! the connected identity; without one, `submit` fails before anything is
//! sent. Failures are returned to the caller as-is, with no retries.

use crate::claims::EncodedSubmission;
use crate::ledger::{
    Claim, ClaimId, ClaimsLedger, ContractStats, LedgerError, Signer, SignerError, SubmitClaim,
};
use crate::types::{Address, TxHash};

/// Errors surfaced by the ledger client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No signing identity connected")]
    NotConnected,

    #[error("Claim not found: {0}")]
    NotFound(ClaimId),

    #[error("Ledger rejected the transaction: {0}")]
    Rejected(String),

    #[error("Ledger call failed: {0}")]
    NetworkFailure(String),
}

impl From<LedgerError> for ClientError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::ClaimNotFound(id) => ClientError::NotFound(id),
            e if e.is_rejection() => ClientError::Rejected(e.to_string()),
            e => ClientError::NetworkFailure(e.to_string()),
        }
    }
}

impl From<SignerError> for ClientError {
    fn from(e: SignerError) -> Self {
        match e {
            SignerError::Signing(inner) => inner.into(),
            other => ClientError::Rejected(other.to_string()),
        }
    }
}

/// Handle for a submission the ledger has accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSubmission {
    pub tx_hash: TxHash,
    pub claim_id: ClaimId,
}

/// Client for a claims ledger
///
/// # Example
///
/// ```ignore
/// let client = LedgerClient::new(&ledger).with_signer(signer);
/// let pending = client.submit(&encoded.submission).await?;
/// let claim = client.get_claim(pending.claim_id).await?;
/// ```
pub struct LedgerClient<L> {
    ledger: L,
    signer: Option<Signer>,
}

impl<L: ClaimsLedger> LedgerClient<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Signer) -> Self {
        self.connect(signer);
        self
    }

    pub fn connect(&mut self, signer: Signer) {
        log::debug!("Signing identity connected: {}", signer.address());
        self.signer = Some(signer);
    }

    pub fn disconnect(&mut self) {
        self.signer = None;
    }

    pub fn is_connected(&self) -> bool {
        self.signer.is_some()
    }

    /// Address of the connected identity
    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(Signer::address)
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Sign and send a claim submission
    ///
    /// Each call carries a fresh nonce, so submitting the same claim twice
    /// records two independent claims.
    pub async fn submit(
        &self,
        submission: &EncodedSubmission,
    ) -> Result<PendingSubmission, ClientError> {
        let signer = self.signer.as_ref().ok_or(ClientError::NotConnected)?;

        let signed = signer.sign(SubmitClaim {
            submission: submission.clone(),
            nonce: rand::random(),
        })?;
        let tx_hash = signed.tx_hash()?;

        log::info!("Submitting claim from {} (tx {})", signer.address(), tx_hash);

        let claim_id = self.ledger.submit_encrypted_claim(&signed).await?;

        Ok(PendingSubmission { tx_hash, claim_id })
    }

    pub async fn get_claim(&self, claim_id: ClaimId) -> Result<Claim, ClientError> {
        Ok(self.ledger.get_claim_metadata(claim_id).await?)
    }

    /// Claim identifiers filed by `address`; empty when it has none
    pub async fn list_user_claims(&self, address: &Address) -> Result<Vec<ClaimId>, ClientError> {
        Ok(self.ledger.get_user_claims(address).await?)
    }

    pub async fn get_stats(&self) -> Result<ContractStats, ClientError> {
        Ok(self.ledger.get_contract_stats().await?)
    }
}
