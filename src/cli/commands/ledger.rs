//! Ledger deployment and statistics commands

use crate::config::{load_config, ConfigError, ConfigOverrides};
use crate::manager::{ClaimsManager, ManagerError};

#[derive(Debug, thiserror::Error)]
pub enum LedgerCommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// Deploy a fresh claims ledger owned by the selected identity
///
/// Every run creates a new, independent ledger. With `save`, the config is
/// switched to the new ledger.
pub async fn deploy(
    password: &str,
    save: bool,
    overrides: &ConfigOverrides,
) -> Result<(), LedgerCommandError> {
    let config = load_config(None, overrides.clone())?;
    let mut manager = ClaimsManager::new(config)?;

    let name = manager.identity_name(None)?.to_string();
    let deployer = manager.load_signer(&name, password)?;

    println!("Deploying contract with identity '{}' ({})", name, deployer.address());

    let report = manager.deploy(&deployer, save).await?;

    println!("✓ {} deployed", report.info.contract_name);
    println!();
    println!("  Contract Address: {}", report.info.contract_address);
    println!("  Owner:            {}", report.info.deployer);
    println!("  Network:          {}", report.info.network);
    println!("  Next Claim ID:    {}", report.next_claim_id);
    println!("  Total Claims:     {}", report.stats.total_claims);
    println!();

    if report.saved {
        println!("  Config updated to use this contract.");
    } else {
        println!("  Use this contract with:");
        println!("    export PRIVACY_SHIELD_CONTRACT_ADDRESS={}", report.info.contract_address);
    }

    Ok(())
}

/// Print the ledger's aggregate counters
pub async fn stats(overrides: &ConfigOverrides) -> Result<(), LedgerCommandError> {
    let config = load_config(None, overrides.clone())?;
    let contract = config.contract_address()?;
    let manager = ClaimsManager::new(config)?;

    let stats = manager.stats().await?;

    println!("Contract: {}", contract);
    println!();
    println!("  Total Claims:     {}", stats.total_claims);
    println!("  Processed Claims: {}", stats.processed_claims);
    println!("  Approved Claims:  {}", stats.approved_claims);

    Ok(())
}
