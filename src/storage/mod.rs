//! Storage layer for client data
//!
//! Manages signing identity encryption and the data directory layout.

pub mod file_system;
pub mod keys;
pub mod models;
