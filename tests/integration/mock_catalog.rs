//! Mock fixture catalog for integration testing.
//!
//! Provides a deterministic `MatchCatalog` implementation that serves a
//! known fixture list, all in-memory with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::sync::{Arc, Mutex};

use matchbook::catalog::MatchCatalog;
use matchbook::odds::compute_odds;
use matchbook::types::{Match, Team};

/// A mock fixture catalog for deterministic testing.
///
/// Fixtures are fully controllable from test code. `matches_between`
/// serves only fixtures that have not kicked off, like the live
/// provider; `match_by_id` resolves started fixtures too, so the ledger's
/// own kickoff check can be exercised.
pub struct MockCatalog {
    fixtures: Vec<Match>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockCatalog {
    /// Create a new mock catalog with the default fixture list.
    pub fn new() -> Self {
        Self::with_fixtures(Self::default_fixtures())
    }

    /// Create a mock with custom fixtures.
    pub fn with_fixtures(fixtures: Vec<Match>) -> Self {
        Self {
            fixtures,
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// A default fixture list covering all three odds buckets plus one
    /// match that has already kicked off.
    fn default_fixtures() -> Vec<Match> {
        let base_kickoff = Utc::now() + Duration::days(2);

        let arsenal = Team {
            id: 1,
            name: "Arsenal FC".to_string(),
            rating: 10,
        };
        let fulham = Team {
            id: 2,
            name: "Fulham FC".to_string(),
            rating: 7,
        };
        let everton = Team {
            id: 3,
            name: "Everton FC".to_string(),
            rating: 6,
        };
        let liverpool = Team {
            id: 4,
            name: "Liverpool FC".to_string(),
            rating: 10,
        };
        let brentford = Team {
            id: 5,
            name: "Brentford FC".to_string(),
            rating: 7,
        };
        let brighton = Team {
            id: 6,
            name: "Brighton & Hove Albion FC".to_string(),
            rating: 7,
        };
        let girona = Team {
            id: 7,
            name: "Girona FC".to_string(),
            rating: 6,
        };
        let real_madrid = Team {
            id: 8,
            name: "Real Madrid CF".to_string(),
            rating: 10,
        };

        vec![
            // Home favored: 10 vs 7.
            Match {
                id: 101,
                odds: Some(compute_odds(&arsenal, &fulham)),
                home: arsenal,
                away: fulham,
                kickoff: base_kickoff,
                competition: Some("PL".to_string()),
            },
            // Away favored: 6 vs 10.
            Match {
                id: 102,
                odds: Some(compute_odds(&everton, &liverpool)),
                home: everton,
                away: liverpool,
                kickoff: base_kickoff + Duration::hours(3),
                competition: Some("PL".to_string()),
            },
            // Evenly matched: 7 vs 7.
            Match {
                id: 103,
                odds: Some(compute_odds(&brentford, &brighton)),
                home: brentford,
                away: brighton,
                kickoff: base_kickoff + Duration::days(1),
                competition: Some("PL".to_string()),
            },
            // Kicked off an hour ago.
            Match {
                id: 104,
                odds: Some(compute_odds(&girona, &real_madrid)),
                home: girona,
                away: real_madrid,
                kickoff: Utc::now() - Duration::hours(1),
                competition: Some("PD".to_string()),
            },
        ]
    }
}

#[async_trait]
impl MatchCatalog for MockCatalog {
    async fn matches_between(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<Match>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        let now = Utc::now();
        let matches = self
            .fixtures
            .iter()
            .filter(|m| {
                let date = m.kickoff.date_naive();
                date >= date_from && date <= date_to
            })
            .filter(|m| {
                competitions.is_empty()
                    || m.competition
                        .as_deref()
                        .is_some_and(|c| competitions.iter().any(|want| want == c))
            })
            .filter(|m| !m.has_kicked_off(now))
            .cloned()
            .collect();

        Ok(matches)
    }

    async fn match_by_id(&self, id: u32) -> Result<Option<Match>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self.fixtures.iter().find(|m| m.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn full_window() -> (NaiveDate, NaiveDate) {
        let today = Utc::now().date_naive();
        (today - Duration::days(1), today + Duration::days(7))
    }

    #[tokio::test]
    async fn test_mock_serves_open_fixtures_in_window() {
        let catalog = MockCatalog::new();
        let (from, to) = full_window();

        let matches = catalog
            .matches_between(from, to, &["PL".to_string()])
            .await
            .unwrap();

        let ids: Vec<u32> = matches.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![101, 102, 103]);
        assert!(matches.iter().all(|m| m.odds.is_some()));
    }

    #[tokio::test]
    async fn test_mock_empty_competition_list_means_all() {
        let catalog = MockCatalog::new();
        let (from, to) = full_window();

        let matches = catalog.matches_between(from, to, &[]).await.unwrap();
        // The PD fixture has kicked off, so only the three PL ones remain.
        assert_eq!(matches.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_window_excludes_out_of_range_kickoffs() {
        let catalog = MockCatalog::new();
        let today = Utc::now().date_naive();

        let matches = catalog
            .matches_between(today + Duration::days(30), today + Duration::days(37), &[])
            .await
            .unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_mock_match_by_id_resolves_started_fixtures() {
        let catalog = MockCatalog::new();

        let open = catalog.match_by_id(101).await.unwrap().unwrap();
        assert_eq!(open.home.name, "Arsenal FC");

        // Started fixtures still resolve; rejecting them is the ledger's job.
        let started = catalog.match_by_id(104).await.unwrap().unwrap();
        assert!(started.has_kicked_off(Utc::now()));

        assert!(catalog.match_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let catalog = MockCatalog::new();
        catalog.set_error("simulated provider outage");

        let (from, to) = full_window();
        assert!(catalog.matches_between(from, to, &[]).await.is_err());
        assert!(catalog.match_by_id(101).await.is_err());

        catalog.clear_error();
        assert!(catalog.match_by_id(101).await.is_ok());
    }
}
