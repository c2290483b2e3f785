//! Privacy Shield Claims
//!
//! Client for filing insurance claims on a claims ledger. Claim amounts and
//! categories are obscured before submission, submissions are signed by a
//! locally stored identity, and a ledger instance can be deployed into the
//! local data directory.

pub mod claims;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod manager;
pub mod storage;
pub mod types;
