//! File system operations for client data
//!
//! Lays out the data directory:
//!
//! ```text
//! <data_dir>/
//!   config.json
//!   identities/<name>/identity.json   metadata
//!   identities/<name>/keys.json       encrypted secret key
//!   ledgers/<address>.db              local ledger instances
//!   deployments/<address>.json        deployment records
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::ledger::Signer;
use crate::storage::keys::KeyError;
use crate::storage::models::{EncryptedIdentityKeys, IdentityMetadata};
use crate::types::Address;

/// File system errors
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Identity already exists: {0}")]
    IdentityExists(String),

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Invalid identity name: '{0}'")]
    InvalidName(String),
}

pub fn identities_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("identities")
}

pub fn identity_dir(data_dir: &Path, name: &str) -> Result<PathBuf, FileSystemError> {
    validate_name(name)?;
    Ok(identities_dir(data_dir).join(name))
}

/// Database file of the ledger deployed at `address`
pub fn ledger_path(data_dir: &Path, address: &Address) -> PathBuf {
    data_dir.join("ledgers").join(format!("{}.db", address))
}

/// Deployment record of the ledger deployed at `address`
pub fn deployment_path(data_dir: &Path, address: &Address) -> PathBuf {
    data_dir.join("deployments").join(format!("{}.json", address))
}

fn validate_name(name: &str) -> Result<(), FileSystemError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(FileSystemError::InvalidName(name.to_string()))
    }
}

/// Persist a new identity
///
/// Writes the encrypted key to `keys.json` and the metadata to
/// `identity.json`. Fails if an identity with that name exists.
pub fn save_identity(
    data_dir: &Path,
    metadata: &IdentityMetadata,
    signer: &Signer,
    password: &str,
) -> Result<(), FileSystemError> {
    let dir = identity_dir(data_dir, &metadata.name)?;
    if dir.exists() {
        return Err(FileSystemError::IdentityExists(metadata.name.clone()));
    }
    fs::create_dir_all(&dir)?;

    let keys = EncryptedIdentityKeys::from_signer(signer, password)?;
    fs::write(dir.join("keys.json"), serde_json::to_string_pretty(&keys)?)?;
    fs::write(
        dir.join("identity.json"),
        serde_json::to_string_pretty(metadata)?,
    )?;

    log::debug!("Saved identity '{}' to {}", metadata.name, dir.display());

    Ok(())
}

/// Read identity metadata without decrypting anything
pub fn load_identity_metadata(
    data_dir: &Path,
    name: &str,
) -> Result<IdentityMetadata, FileSystemError> {
    let dir = identity_dir(data_dir, name)?;
    if !dir.exists() {
        return Err(FileSystemError::IdentityNotFound(name.to_string()));
    }

    let json = fs::read_to_string(dir.join("identity.json"))?;
    Ok(serde_json::from_str(&json)?)
}

/// Load and decrypt an identity's signing key
pub fn load_identity(
    data_dir: &Path,
    name: &str,
    password: &str,
) -> Result<(Signer, IdentityMetadata), FileSystemError> {
    let metadata = load_identity_metadata(data_dir, name)?;

    let json = fs::read_to_string(identity_dir(data_dir, name)?.join("keys.json"))?;
    let keys: EncryptedIdentityKeys = serde_json::from_str(&json)?;
    let signer = keys.to_signer(password)?;

    Ok((signer, metadata))
}

/// List stored identities, sorted by name
pub fn list_identities(data_dir: &Path) -> Result<Vec<IdentityMetadata>, FileSystemError> {
    let dir = identities_dir(data_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut identities = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        match load_identity_metadata(data_dir, &name) {
            Ok(metadata) => identities.push(metadata),
            Err(e) => log::warn!("Skipping unreadable identity '{}': {}", name, e),
        }
    }

    identities.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(identities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_names() {
        for name in ["", ".", "..", "a/b", "a\\b", "with space"] {
            assert!(validate_name(name).is_err(), "{:?} should be rejected", name);
        }
        assert!(validate_name("alice-01_x.y").is_ok());
    }

    #[test]
    fn ledger_and_deployment_paths_use_address() {
        let base = Path::new("/data");
        let address = Address::ZERO;
        assert_eq!(
            ledger_path(base, &address),
            PathBuf::from("/data/ledgers/0x0000000000000000000000000000000000000000.db")
        );
        assert_eq!(
            deployment_path(base, &address),
            PathBuf::from("/data/deployments/0x0000000000000000000000000000000000000000.json")
        );
    }
}
