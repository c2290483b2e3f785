//! Config command implementations

use crate::config::{load_config, save_config, ConfigError, ConfigOverrides};

/// Write the effective configuration to `<data_dir>/config.json`
pub fn init(decimals: Option<u32>, overrides: ConfigOverrides) -> Result<(), ConfigError> {
    let overrides = overrides.merge(ConfigOverrides {
        decimals,
        ..ConfigOverrides::default()
    });
    let config = load_config(None, overrides)?;

    save_config(&config, None)?;

    println!("✓ Configuration initialized");
    println!("  Config file: {}", config.config_path().display());
    println!("  Decimals:    {}", config.ledger.decimals);
    if let Some(address) = config.ledger.contract_address {
        println!("  Contract:    {}", address);
    }

    Ok(())
}

/// Print the configuration after all overrides are applied
pub fn show(overrides: ConfigOverrides) -> Result<(), ConfigError> {
    let config = load_config(None, overrides)?;

    println!("Data directory: {}", config.data_dir.display());
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
