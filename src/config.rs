//! Configuration types for privacy-shield-claims
//!
//! Manages the data directory, the ledger contract in use, the default
//! signing identity and the amount precision.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::claims::encoder::{DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::types::Address;

/// Global client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub ledger: LedgerConfig,

    /// Identity used when a command does not name one
    pub identity: Option<String>,

    /// Directory holding identities, ledgers and this config (not persisted)
    #[serde(skip)]
    pub data_dir: PathBuf,
}

/// Ledger contract configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Address of the deployed claims ledger
    pub contract_address: Option<Address>,

    /// Decimals of the ledger's smallest amount unit
    pub decimals: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig {
                contract_address: None,
                decimals: DEFAULT_DECIMALS,
            },
            identity: None,
            data_dir: PathBuf::new(),
        }
    }
}

impl GlobalConfig {
    /// Configured contract address, or an error explaining how to set one
    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        self.ledger.contract_address.ok_or_else(|| {
            ConfigError::Invalid(
                "No contract address configured (deploy with --save, pass --contract, \
                 or set PRIVACY_SHIELD_CONTRACT_ADDRESS)"
                    .to_string(),
            )
        })
    }

    /// Path of this configuration's file inside its data directory
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Data directory not found")]
    DirectoryNotFound,
}

/// Configuration overrides from CLI arguments or environment variables
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub data_dir: Option<String>,
    pub contract_address: Option<Address>,
    pub identity: Option<String>,
    pub decimals: Option<u32>,
}

impl ConfigOverrides {
    /// Create overrides from environment variables
    ///
    /// `NEXT_PUBLIC_CONTRACT_ADDRESS` is honoured when
    /// `PRIVACY_SHIELD_CONTRACT_ADDRESS` is not set. The zero address counts
    /// as unset.
    pub fn from_env() -> Self {
        let contract_address = std::env::var("PRIVACY_SHIELD_CONTRACT_ADDRESS")
            .or_else(|_| std::env::var("NEXT_PUBLIC_CONTRACT_ADDRESS"))
            .ok()
            .and_then(|s| match s.parse::<Address>() {
                Ok(address) if !address.is_zero() => Some(address),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("Ignoring contract address from environment: {}", e);
                    None
                }
            });

        Self {
            data_dir: std::env::var("PRIVACY_SHIELD_DATA_DIR").ok(),
            contract_address,
            identity: std::env::var("PRIVACY_SHIELD_IDENTITY").ok(),
            decimals: std::env::var("PRIVACY_SHIELD_DECIMALS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Merge with another set of overrides (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.contract_address.is_some() {
            self.contract_address = other.contract_address;
        }
        if other.identity.is_some() {
            self.identity = other.identity;
        }
        if other.decimals.is_some() {
            self.decimals = other.decimals;
        }
        self
    }
}

/// Get the default data directory path
///
/// Returns: `~/.privacy-shield-claims/`
pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".privacy-shield-claims"))
        .ok_or(ConfigError::DirectoryNotFound)
}

/// Load configuration with overrides
///
/// # Priority (highest to lowest):
/// 1. CLI overrides (passed as argument)
/// 2. Environment variables
/// 3. Config file (`<data_dir>/config.json` unless `config_path` is given)
/// 4. Defaults
pub fn load_config(
    config_path: Option<&Path>,
    cli_overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    let overrides = ConfigOverrides::from_env().merge(cli_overrides);

    let data_dir = match overrides.data_dir.as_deref() {
        Some(dir) => PathBuf::from(dir),
        None => default_data_dir()?,
    };

    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => data_dir.join("config.json"),
    };

    let mut config = read_config_file(&path)?;
    config.data_dir = data_dir;

    apply_overrides(&mut config, overrides)?;

    Ok(config)
}

/// Load only what is stored in `<data_dir>/config.json`
///
/// No environment or CLI overrides are applied, so the result is safe to
/// write back with [`save_config`].
pub fn load_file_config(data_dir: &Path) -> Result<GlobalConfig, ConfigError> {
    let mut config = read_config_file(&data_dir.join("config.json"))?;
    config.data_dir = data_dir.to_path_buf();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<GlobalConfig, ConfigError> {
    if !path.exists() {
        return Ok(GlobalConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save configuration to file
///
/// Creates parent directories if they don't exist. Without `config_path`
/// the file goes to `<data_dir>/config.json`.
pub fn save_config(config: &GlobalConfig, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => config.config_path(),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&path, serde_json::to_string_pretty(config)?)?;

    Ok(())
}

fn apply_overrides(config: &mut GlobalConfig, overrides: ConfigOverrides) -> Result<(), ConfigError> {
    if let Some(address) = overrides.contract_address {
        config.ledger.contract_address = Some(address);
    }
    if let Some(identity) = overrides.identity {
        config.identity = Some(identity);
    }
    if let Some(decimals) = overrides.decimals {
        config.ledger.decimals = decimals;
    }

    if config.ledger.decimals > MAX_DECIMALS {
        return Err(ConfigError::Invalid(format!(
            "decimals must be at most {}, got {}",
            MAX_DECIMALS, config.ledger.decimals
        )));
    }

    Ok(())
}
