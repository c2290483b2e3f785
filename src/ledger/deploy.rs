//! Ledger deployment
//!
//! Instantiates a fresh claims ledger owned by the deployer. Every run
//! creates a new, independent instance at a new address; nothing is rolled
//! back or migrated.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{LedgerError, Signer, SqliteLedger};
use crate::storage::file_system::{deployment_path, ledger_path};
use crate::types::{keccak256, Address};

/// Contract name recorded in deployment info
pub const CONTRACT_NAME: &str = "PrivacyShieldClaims";

/// Network label for ledgers hosted in the local data directory
pub const LOCAL_NETWORK: &str = "local";

/// Deployment errors
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No deployment record for {0}")]
    NotFound(Address),
}

/// Record of a ledger deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub contract_address: Address,
    pub network: String,
    pub deployer: Address,
    pub deployment_time: DateTime<Utc>,
    pub contract_name: String,
}

/// Derive a fresh contract address for `deployer`
fn contract_address(deployer: &Address, deployed_at: &DateTime<Utc>) -> Address {
    let mut preimage = deployer.as_bytes().to_vec();
    preimage.extend_from_slice(&rand::random::<u64>().to_be_bytes());
    preimage.extend_from_slice(&deployed_at.timestamp_micros().to_be_bytes());

    let digest = keccak256(&preimage);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::from_bytes(bytes)
}

/// Deploy a new ledger instance owned by `deployer`
///
/// Creates `<data_dir>/ledgers/<address>.db` and writes the deployment
/// record to `<data_dir>/deployments/<address>.json`.
pub fn deploy(
    data_dir: &Path,
    deployer: &Signer,
) -> Result<(SqliteLedger, DeploymentInfo), DeployError> {
    log::info!("Deploying {} contract...", CONTRACT_NAME);

    let deployment_time = Utc::now();
    let owner = deployer.address();
    let address = contract_address(&owner, &deployment_time);

    let ledger = SqliteLedger::create(ledger_path(data_dir, &address), owner, address)?;

    let info = DeploymentInfo {
        contract_address: address,
        network: LOCAL_NETWORK.to_string(),
        deployer: owner,
        deployment_time,
        contract_name: CONTRACT_NAME.to_string(),
    };

    let record_path = deployment_path(data_dir, &address);
    if let Some(parent) = record_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&record_path, serde_json::to_string_pretty(&info)?)?;

    log::info!("{} deployed to: {}", CONTRACT_NAME, address);

    Ok((ledger, info))
}

/// Read the deployment record for `address`
pub fn load_deployment(data_dir: &Path, address: &Address) -> Result<DeploymentInfo, DeployError> {
    let path = deployment_path(data_dir, address);
    if !path.exists() {
        return Err(DeployError::NotFound(*address));
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
