//! CLI command implementations

pub mod claim;
pub mod config;
pub mod identity;
pub mod ledger;
