//! Privacy Shield Claims CLI
//!
//! Command-line interface for submitting and tracking insurance claims

use clap::Parser;
use privacy_shield_claims::claims::ClaimForm;
use privacy_shield_claims::cli::args::{
    ClaimAction, Cli, Commands, ConfigAction, IdentityAction,
};
use privacy_shield_claims::cli::commands;
use privacy_shield_claims::config::ConfigOverrides;
use std::process;

fn main() {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Build config overrides from global arguments
    let overrides = ConfigOverrides {
        data_dir: cli.data_dir.clone(),
        contract_address: cli.contract,
        identity: cli.identity.clone(),
        decimals: None,
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Failed to create async runtime: {}", e);
            process::exit(1);
        }
    };

    let result: Result<(), Box<dyn std::error::Error>> = match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Init { decimals } => {
                commands::config::init(decimals, overrides).map_err(Into::into)
            }
            ConfigAction::Show => commands::config::show(overrides).map_err(Into::into),
        },

        Commands::Identity { action } => match action {
            IdentityAction::Create { name, password } => {
                commands::identity::create(name, password, overrides).map_err(Into::into)
            }
            IdentityAction::List => commands::identity::list(overrides).map_err(Into::into),
            IdentityAction::Show { name } => {
                commands::identity::show(name, overrides).map_err(Into::into)
            }
        },

        Commands::Deploy { password, save } => runtime
            .block_on(commands::ledger::deploy(&password, save, &overrides))
            .map_err(Into::into),

        Commands::Claim { action } => match action {
            ClaimAction::Submit {
                claim_type,
                amount,
                description,
                incident_date,
                attachments,
                password,
            } => {
                let form = ClaimForm {
                    claim_type,
                    amount,
                    description,
                    incident_date,
                    attachments,
                };
                runtime
                    .block_on(commands::claim::submit(form, &password, &overrides))
                    .map_err(Into::into)
            }

            ClaimAction::Show { claim_id, reveal } => runtime
                .block_on(commands::claim::show(claim_id, reveal, &overrides))
                .map_err(Into::into),

            ClaimAction::List {
                address,
                format,
                reveal,
            } => runtime
                .block_on(commands::claim::list(address, format, reveal, &overrides))
                .map_err(Into::into),

            ClaimAction::Process {
                claim_id,
                reject,
                public_amount,
                password,
            } => runtime
                .block_on(commands::claim::process(
                    claim_id,
                    !reject,
                    &public_amount,
                    &password,
                    &overrides,
                ))
                .map_err(Into::into),
        },

        Commands::Stats => runtime
            .block_on(commands::ledger::stats(&overrides))
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
