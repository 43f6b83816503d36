//! Fixture catalog integrations.
//!
//! Defines the `MatchCatalog` trait and provides the football-data.org
//! implementation used in production. The ledger consumes the trait only;
//! tests substitute their own catalogs.

pub mod football_data;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[cfg(test)]
use mockall::automock;

use crate::types::Match;

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Abstraction over fixture data providers.
///
/// Implementors serve scheduled fixtures with kickoff instants in UTC and
/// team ratings already attached. Returned matches carry display odds in
/// their transient `odds` field; the ledger ignores that field and
/// recomputes odds at commit time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MatchCatalog: Send + Sync {
    /// Fetch open fixtures within a date window for the given competition
    /// codes (e.g. `["PL", "CL"]`). An empty code list means all
    /// competitions the provider serves.
    async fn matches_between(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<Match>>;

    /// Resolve a single fixture by provider id. Returns `None` when the
    /// provider does not know the id.
    async fn match_by_id(&self, id: u32) -> Result<Option<Match>>;
}

// ---------------------------------------------------------------------------
// Team ratings
// ---------------------------------------------------------------------------

/// Name-keyed team strength ratings.
///
/// Fixture providers serve no rating scale, so ratings come from
/// configuration and are immutable once loaded. Teams missing from the
/// table get the default rating, which prices their fixtures as even
/// unless the opponent is listed.
#[derive(Debug, Clone)]
pub struct TeamRatings {
    ratings: HashMap<String, i32>,
    default_rating: i32,
}

impl TeamRatings {
    pub fn new(ratings: HashMap<String, i32>, default_rating: i32) -> Self {
        Self {
            ratings,
            default_rating,
        }
    }

    /// Rating for a team name, falling back to the default.
    pub fn rating_for(&self, name: &str) -> i32 {
        self.ratings
            .get(name)
            .copied()
            .unwrap_or(self.default_rating)
    }

    /// Number of explicitly rated teams.
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
