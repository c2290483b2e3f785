//! Claims manager - Main integration layer
//!
//! Coordinates between config, identity storage, the claim encoder and the
//! ledger layer.

use std::path::Path;

use crate::claims::{
    format_amount, parse_amount, ClaimEncoder, ClaimForm, ClaimMetadata, ClaimType, EncodeError,
    EncodeWarning, FormErrors,
};
use crate::config::{load_file_config, save_config, ConfigError, GlobalConfig};
use crate::ledger::{
    self, Claim, ClaimId, ClientError, ContractStats, DeployError, DeploymentInfo, LedgerClient,
    LedgerError, ProcessClaim, Signer, SignerError, SqliteLedger,
};
use crate::storage::{
    file_system::{
        ledger_path, list_identities, load_identity, load_identity_metadata, save_identity,
        FileSystemError,
    },
    models::{IdentityInfo, IdentityMetadata},
};
use crate::types::{Address, TxHash};

/// Errors that can occur in the claims manager
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("File system error: {0}")]
    FileSystem(#[from] FileSystemError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Form(#[from] FormErrors),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("Signing error: {0}")]
    Signer(#[from] SignerError),

    #[error("Deployment error: {0}")]
    Deploy(#[from] DeployError),

    #[error("No identity selected (use --identity <name> or set one in the config)")]
    IdentityRequired,
}

/// Outcome of an accepted claim submission
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub tx_hash: TxHash,
    pub claim: Claim,
    pub claim_type: ClaimType,

    /// Amount in the ledger's smallest unit, as encoded
    pub scaled_amount: u128,

    pub warnings: Vec<EncodeWarning>,
}

/// A claim with everything this client can recover from the ledger
#[derive(Debug, Clone)]
pub struct ClaimDetails {
    pub claim: Claim,

    /// Category matched from the recorded type code
    pub claim_type: Option<ClaimType>,

    pub content_hash: [u8; 32],
    pub metadata: Option<ClaimMetadata>,
}

/// Result of deploying a new ledger
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub info: DeploymentInfo,
    pub next_claim_id: ClaimId,
    pub stats: ContractStats,

    /// Whether the config now points at the new ledger
    pub saved: bool,
}

/// Main claims manager
///
/// Every ledger operation opens the ledger configured in
/// `ledger.contract_address`; nothing is cached between calls.
pub struct ClaimsManager {
    config: GlobalConfig,
    encoder: ClaimEncoder,
}

impl ClaimsManager {
    /// Create a new claims manager
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = load_config(None, ConfigOverrides::default())?;
    /// let manager = ClaimsManager::new(config)?;
    /// ```
    pub fn new(config: GlobalConfig) -> Result<Self, ManagerError> {
        let encoder = ClaimEncoder::new(config.ledger.decimals)?;
        Ok(Self { config, encoder })
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub fn encoder(&self) -> &ClaimEncoder {
        &self.encoder
    }

    /// Render a scaled amount with the configured precision
    pub fn format_amount(&self, scaled: u128) -> String {
        format_amount(scaled, self.encoder.decimals())
    }

    /// Generate a new signing identity and store it encrypted
    pub fn create_identity(&self, name: &str, password: &str) -> Result<IdentityInfo, ManagerError> {
        let signer = Signer::generate();
        let metadata = IdentityMetadata::new(name.to_string(), signer.address());

        save_identity(self.data_dir(), &metadata, &signer, password)?;
        log::info!("Created identity '{}' ({})", name, signer.address());

        Ok(IdentityInfo::from_signer(name.to_string(), &signer))
    }

    pub fn list_identities(&self) -> Result<Vec<IdentityMetadata>, ManagerError> {
        Ok(list_identities(self.data_dir())?)
    }

    pub fn identity_metadata(&self, name: &str) -> Result<IdentityMetadata, ManagerError> {
        Ok(load_identity_metadata(self.data_dir(), name)?)
    }

    /// Pick the explicitly named identity, else the configured default
    pub fn identity_name<'a>(&'a self, name: Option<&'a str>) -> Result<&'a str, ManagerError> {
        name.or(self.config.identity.as_deref())
            .ok_or(ManagerError::IdentityRequired)
    }

    /// Decrypt an identity's signing key
    pub fn load_signer(&self, name: &str, password: &str) -> Result<Signer, ManagerError> {
        let (signer, _) = load_identity(self.data_dir(), name, password)?;
        Ok(signer)
    }

    /// Open the configured ledger
    pub fn open_ledger(&self) -> Result<SqliteLedger, ManagerError> {
        let address = self.config.contract_address()?;
        Ok(SqliteLedger::open(ledger_path(self.data_dir(), &address))?)
    }

    /// Deploy a new ledger owned by `deployer`
    ///
    /// With `save`, the config file is updated to use the new ledger. Only
    /// the contract address changes in the stored file.
    pub async fn deploy(
        &mut self,
        deployer: &Signer,
        save: bool,
    ) -> Result<DeploymentReport, ManagerError> {
        let (ledger, info) = ledger::deploy(self.data_dir(), deployer)?;

        let next_claim_id = ledger.next_claim_id()?;
        let stats = LedgerClient::new(&ledger).get_stats().await?;

        if save {
            // Only the stored file is rewritten; env and CLI overrides stay out of it
            let mut stored = load_file_config(self.data_dir())?;
            stored.ledger.contract_address = Some(info.contract_address);
            save_config(&stored, None)?;

            self.config.ledger.contract_address = Some(info.contract_address);
            log::info!("Config now points at ledger {}", info.contract_address);
        }

        Ok(DeploymentReport {
            info,
            next_claim_id,
            stats,
            saved: save,
        })
    }

    /// Validate, encode and submit a claim form
    ///
    /// Form problems come back as [`ManagerError::Form`] before the ledger
    /// is touched.
    pub async fn submit_claim(
        &self,
        form: &ClaimForm,
        signer: Signer,
    ) -> Result<SubmissionReceipt, ManagerError> {
        let encoded = form.prepare(&self.encoder)?;

        let ledger = self.open_ledger()?;
        let client = LedgerClient::new(&ledger).with_signer(signer);

        let pending = client.submit(&encoded.submission).await?;
        let claim = client.get_claim(pending.claim_id).await?;

        log::info!(
            "Claim {} recorded (tx {})",
            pending.claim_id,
            pending.tx_hash
        );

        Ok(SubmissionReceipt {
            tx_hash: pending.tx_hash,
            claim,
            claim_type: encoded.claim_type,
            scaled_amount: encoded.scaled_amount,
            warnings: encoded.warnings,
        })
    }

    pub async fn get_claim(&self, claim_id: ClaimId) -> Result<Claim, ManagerError> {
        let ledger = self.open_ledger()?;
        Ok(LedgerClient::new(&ledger).get_claim(claim_id).await?)
    }

    /// Claim record plus the recorded fields this client can interpret
    pub async fn claim_details(&self, claim_id: ClaimId) -> Result<ClaimDetails, ManagerError> {
        let ledger = self.open_ledger()?;
        let claim = LedgerClient::new(&ledger).get_claim(claim_id).await?;
        let fields = ledger.get_encrypted_fields(claim_id)?;

        let metadata = match fields.metadata.as_deref().map(ClaimMetadata::from_bytes) {
            Some(Ok(metadata)) => Some(metadata),
            Some(Err(e)) => {
                log::warn!("Claim {} carries unreadable metadata: {}", claim_id, e);
                None
            }
            None => None,
        };

        Ok(ClaimDetails {
            claim,
            claim_type: ClaimType::from_type_code(&fields.type_code),
            content_hash: fields.content_hash,
            metadata,
        })
    }

    /// All claims filed by `claimant`, in submission order
    pub async fn list_claims(&self, claimant: &Address) -> Result<Vec<Claim>, ManagerError> {
        let ledger = self.open_ledger()?;
        let client = LedgerClient::new(&ledger);

        let mut claims = Vec::new();
        for claim_id in client.list_user_claims(claimant).await? {
            claims.push(client.get_claim(claim_id).await?);
        }
        Ok(claims)
    }

    pub async fn stats(&self) -> Result<ContractStats, ManagerError> {
        let ledger = self.open_ledger()?;
        Ok(LedgerClient::new(&ledger).get_stats().await?)
    }

    /// Owner-only: approve or reject a claim and disclose its amount
    ///
    /// `public_amount` is a decimal string in whole units.
    pub async fn process_claim(
        &self,
        owner: &Signer,
        claim_id: ClaimId,
        approved: bool,
        public_amount: &str,
    ) -> Result<Claim, ManagerError> {
        let public_amount = parse_amount(public_amount, self.encoder.decimals())?;

        let ledger = self.open_ledger()?;
        let order = owner.sign(ProcessClaim {
            claim_id,
            approved,
            public_amount,
            nonce: rand::random(),
        })?;

        Ok(ledger.process_claim(&order).await?)
    }
}
