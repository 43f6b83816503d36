//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Secrets (the fixture provider token) are referenced by env-var name in
//! the config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use crate::catalog::TeamRatings;
use crate::ledger::LedgerConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub wagering: WageringConfig,
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WageringConfig {
    pub max_commit_attempts: u32,
    pub collaborator_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub api_token_env: String,
    /// Competition codes to scan (e.g. `["PL", "BL1"]`). Empty means all
    /// competitions the provider serves.
    #[serde(default)]
    pub competitions: Vec<String>,
    pub default_rating: i32,
    /// Strength ratings keyed by provider team name. Unlisted teams get
    /// `default_rating`.
    #[serde(default)]
    pub team_ratings: HashMap<String, i32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub database_url: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

impl WageringConfig {
    /// Translate the TOML section into the ledger's runtime settings.
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            max_commit_attempts: self.max_commit_attempts,
            collaborator_timeout: Duration::from_secs(self.collaborator_timeout_secs),
        }
    }
}

impl CatalogConfig {
    /// Build the ratings table the catalog attaches to fixtures.
    pub fn ratings_table(&self) -> TeamRatings {
        TeamRatings::new(self.team_ratings.clone(), self.default_rating)
    }
}
