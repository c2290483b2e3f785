//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{Address, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "privacy-shield-claims",
    version,
    about = "Privacy Shield Claims - submit insurance claims to a claims ledger",
    long_about = None
)]
pub struct Cli {
    /// Custom data directory (default: ~/.privacy-shield-claims)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Claims ledger contract address (overrides config)
    #[arg(short, long, global = true)]
    pub contract: Option<Address>,

    /// Signing identity to use (overrides config)
    #[arg(short, long, global = true)]
    pub identity: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize or manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Signing identity management
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },

    /// Deploy a new claims ledger owned by the selected identity
    Deploy {
        /// Password to decrypt the identity
        #[arg(short, long)]
        password: String,

        /// Point the config at the new ledger
        #[arg(long)]
        save: bool,
    },

    /// Claim submission and lookup
    Claim {
        #[command(subcommand)]
        action: ClaimAction,
    },

    /// Show ledger-wide claim counters
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize configuration file with defaults
    Init {
        /// Decimals of the ledger's smallest amount unit (default: 18)
        #[arg(long)]
        decimals: Option<u32>,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Subcommand, Debug)]
pub enum IdentityAction {
    /// Generate a new signing identity
    Create {
        /// Name of the identity
        name: String,

        /// Password to encrypt the identity
        #[arg(short, long)]
        password: String,
    },

    /// List stored identities
    List,

    /// Show an identity's address
    Show {
        /// Name of the identity (defaults to --identity or the config)
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ClaimAction {
    /// Submit a new claim
    Submit {
        /// Claim type label (e.g., "Medical", "Auto Collision")
        #[arg(short = 't', long)]
        claim_type: String,

        /// Claimed amount (e.g., 1200.50)
        #[arg(short, long)]
        amount: String,

        /// Description of the incident (at least 10 characters)
        #[arg(short, long)]
        description: String,

        /// Incident date (YYYY-MM-DD)
        #[arg(long)]
        incident_date: String,

        /// Supporting documents to fingerprint
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,

        /// Password to decrypt the identity
        #[arg(short, long)]
        password: String,
    },

    /// Show a single claim
    Show {
        /// Claim identifier
        claim_id: u64,

        /// Show claim fields instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// List claims filed by an address (defaults to the selected identity)
    List {
        /// Claimant address
        #[arg(long)]
        address: Option<Address>,

        /// Output format: table or json
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,

        /// Show claim fields instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Approve or reject a claim (ledger owner only)
    Process {
        /// Claim identifier
        claim_id: u64,

        /// Reject instead of approving
        #[arg(long)]
        reject: bool,

        /// Amount to disclose publicly
        #[arg(long, default_value = "0")]
        public_amount: String,

        /// Password to decrypt the identity
        #[arg(short, long)]
        password: String,
    },
}
