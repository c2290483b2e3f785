//! Claim CLI Commands
//!
//! Submission, lookup, listing and owner processing of claims. Claim fields
//! are masked on screen unless `--reveal` is given.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::claims::{ClaimForm, FormErrors};
use crate::config::{load_config, ConfigError, ConfigOverrides};
use crate::ledger::{Claim, ClaimId, ClaimStatus};
use crate::manager::{ClaimsManager, ManagerError};
use crate::types::{Address, OutputFormat};

const MASKED_TYPE: &str = "████████████";
const MASKED_AMOUNT: &str = "$████";
const MASKED_DATE: &str = "██/██/████";

/// Error type for claim command operations
#[derive(Debug, thiserror::Error)]
pub enum ClaimCommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manager error: {0}")]
    Manager(#[from] ManagerError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Claim form has {0} error(s)")]
    InvalidForm(usize),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("No claimant address (use --address or select an identity)")]
    ClaimantRequired,
}

/// Validate, encode and submit a claim with the selected identity
pub async fn submit(
    form: ClaimForm,
    password: &str,
    overrides: &ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    if let Err(errors) = form.validate() {
        return Err(report_form_errors(&errors));
    }

    let config = load_config(None, overrides.clone())?;
    let manager = ClaimsManager::new(config)?;

    let name = manager.identity_name(None)?.to_string();
    let signer = manager.load_signer(&name, password)?;

    let receipt = match manager.submit_claim(&form, signer).await {
        Ok(receipt) => receipt,
        Err(ManagerError::Form(errors)) => return Err(report_form_errors(&errors)),
        Err(e @ (ManagerError::Client(_) | ManagerError::Ledger(_))) => {
            return Err(ClaimCommandError::SubmissionFailed(e.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &receipt.warnings {
        println!("⚠ {}", warning);
    }

    println!("✓ Claim submitted");
    println!();
    println!("  Claim ID:    {}", receipt.claim.claim_id);
    println!("  Transaction: {}", receipt.tx_hash);
    println!("  Claim Type:  {}", receipt.claim_type);
    println!(
        "  Amount:      {}",
        manager.format_amount(receipt.scaled_amount)
    );
    println!("  Status:      {}", receipt.claim.status());

    Ok(())
}

fn report_form_errors(errors: &FormErrors) -> ClaimCommandError {
    eprintln!("Please fix the following:");
    for error in &errors.0 {
        eprintln!("  {}: {}", error.field, error.message);
    }
    ClaimCommandError::InvalidForm(errors.0.len())
}

/// Show one claim
pub async fn show(
    claim_id: ClaimId,
    reveal: bool,
    overrides: &ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let config = load_config(None, overrides.clone())?;
    let manager = ClaimsManager::new(config)?;

    let details = manager.claim_details(claim_id).await?;
    let claim = &details.claim;

    println!("Claim #{}", claim.claim_id);
    println!();
    println!("  Status:       {}", claim.status());
    println!("  Claimant:     {}", claim.claimant);

    if reveal {
        let claim_type = details
            .claim_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        println!("  Claim Type:   {}", claim_type);
        println!("  Amount:       {}", public_amount(&manager, claim));
        println!("  Submitted:    {}", format_timestamp(claim.submission_time));
        match &details.metadata {
            Some(metadata) => {
                println!("  Incident:     {}", metadata.incident_date);
                println!("  Attachments:  {}", metadata.attachments.len());
                for attachment in &metadata.attachments {
                    println!(
                        "    {} ({} bytes, sha256 {})",
                        attachment.name, attachment.size, attachment.sha256
                    );
                }
            }
            None => println!("  Incident:     -"),
        }
        println!("  Content Hash: 0x{}", hex::encode(details.content_hash));
    } else {
        println!("  Claim Type:   {}", MASKED_TYPE);
        println!("  Amount:       {}", MASKED_AMOUNT);
        println!("  Submitted:    {}", MASKED_DATE);
        println!();
        println!("  Run with --reveal to show claim details.");
    }

    Ok(())
}

#[derive(Serialize)]
struct ClaimRow {
    claim_id: ClaimId,
    claimant: Address,
    status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    submission_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_amount: Option<String>,
}

/// List claims filed by an address
pub async fn list(
    address: Option<Address>,
    format: OutputFormat,
    reveal: bool,
    overrides: &ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let config = load_config(None, overrides.clone())?;
    let manager = ClaimsManager::new(config)?;

    let claimant = match address {
        Some(address) => address,
        None => {
            let name = manager
                .identity_name(None)
                .map_err(|_| ClaimCommandError::ClaimantRequired)?;
            manager.identity_metadata(name)?.address
        }
    };

    let claims = manager.list_claims(&claimant).await?;

    match format {
        OutputFormat::Json => {
            let rows: Vec<ClaimRow> = claims
                .iter()
                .map(|claim| ClaimRow {
                    claim_id: claim.claim_id,
                    claimant: claim.claimant,
                    status: claim.status(),
                    submission_time: reveal.then_some(claim.submission_time),
                    public_amount: reveal.then(|| manager.format_amount(claim.public_amount)),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            if claims.is_empty() {
                println!("No claims found for {}.", claimant);
                return Ok(());
            }

            println!("Claims for {} ({}):", claimant, claims.len());
            println!();
            println!("  {:<8} {:<10} {:<22} {}", "ID", "Status", "Submitted", "Amount");
            for claim in &claims {
                let (submitted, amount) = if reveal {
                    (
                        format_timestamp(claim.submission_time),
                        public_amount(&manager, claim),
                    )
                } else {
                    (MASKED_DATE.to_string(), MASKED_AMOUNT.to_string())
                };
                println!(
                    "  {:<8} {:<10} {:<22} {}",
                    claim.claim_id,
                    claim.status().to_string(),
                    submitted,
                    amount
                );
            }
        }
    }

    Ok(())
}

/// Approve or reject a claim as the ledger owner
pub async fn process(
    claim_id: ClaimId,
    approved: bool,
    public_amount: &str,
    password: &str,
    overrides: &ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let config = load_config(None, overrides.clone())?;
    let manager = ClaimsManager::new(config)?;

    let name = manager.identity_name(None)?.to_string();
    let owner = manager.load_signer(&name, password)?;

    let claim = manager
        .process_claim(&owner, claim_id, approved, public_amount)
        .await?;

    println!("✓ Claim #{} {}", claim.claim_id, claim.status());
    println!(
        "  Public Amount: {}",
        manager.format_amount(claim.public_amount)
    );

    Ok(())
}

fn public_amount(manager: &ClaimsManager, claim: &Claim) -> String {
    if claim.is_processed {
        manager.format_amount(claim.public_amount)
    } else {
        "undisclosed".to_string()
    }
}

fn format_timestamp(secs: u64) -> String {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| secs.to_string())
}
