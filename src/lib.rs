//! MATCHBOOK: Fixture Odds & Points Wagering Core
//!
//! Library crate exposing all modules for use by integration tests
//! and embedding services.

pub mod config;
pub mod types;
pub mod odds;
pub mod catalog;
pub mod store;
pub mod ledger;
