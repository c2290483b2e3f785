//! Identity command implementations

use crate::config::{load_config, ConfigError, ConfigOverrides};
use crate::manager::{ClaimsManager, ManagerError};

#[derive(Debug, thiserror::Error)]
pub enum IdentityCommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),
}

/// Generate and store a new signing identity
pub fn create(
    name: String,
    password: String,
    overrides: ConfigOverrides,
) -> Result<(), IdentityCommandError> {
    let config = load_config(None, overrides)?;
    let manager = ClaimsManager::new(config)?;

    let info = manager.create_identity(&name, &password)?;

    println!("✓ Identity '{}' created successfully", info.name);
    println!();
    println!("  Address:    {}", info.address);
    println!("  Public Key: {}", info.public_key);
    println!();
    println!("  The secret key is encrypted with your password. It cannot be recovered without it.");

    Ok(())
}

/// List stored identities
pub fn list(overrides: ConfigOverrides) -> Result<(), IdentityCommandError> {
    let config = load_config(None, overrides)?;
    let default_identity = config.identity.clone();
    let manager = ClaimsManager::new(config)?;

    let identities = manager.list_identities()?;

    if identities.is_empty() {
        println!("No identities found.");
        println!();
        println!("Create a new identity with:");
        println!("  privacy-shield-claims identity create <name> --password <password>");
        return Ok(());
    }

    println!("Identities ({}):", identities.len());
    println!();

    for identity in identities {
        let marker = if default_identity.as_deref() == Some(identity.name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}", identity.name, marker);
        println!("    Address: {}", identity.address);
        println!(
            "    Created: {}",
            identity.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!();
    }

    Ok(())
}

/// Show an identity's public details (no password needed)
pub fn show(name: Option<String>, overrides: ConfigOverrides) -> Result<(), IdentityCommandError> {
    let config = load_config(None, overrides)?;
    let manager = ClaimsManager::new(config)?;

    let name = manager.identity_name(name.as_deref())?;
    let metadata = manager.identity_metadata(name)?;

    println!("Identity: {}", metadata.name);
    println!("  Address: {}", metadata.address);
    println!(
        "  Created: {}",
        metadata.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}
