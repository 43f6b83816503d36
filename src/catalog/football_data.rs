//! football-data.org fixture integration.
//!
//! Serves upcoming fixtures for the configured competitions, with team
//! ratings attached from the configured table and display odds derived
//! at load time.
//!
//! API docs: https://www.football-data.org/documentation/quickref
//! Base URL: https://api.football-data.org/v4
//! Rate limit: 10 requests/minute on the free tier
//! Auth: `X-Auth-Token: {token}` header on every request.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use super::{MatchCatalog, TeamRatings};
use crate::odds::compute_odds;
use crate::types::{Match, Team};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const BASE_URL: &str = "https://api.football-data.org/v4";
const AUTH_HEADER: &str = "X-Auth-Token";

/// Fixture statuses that count as wagering inventory. Anything in play,
/// finished, or abandoned is not listed.
const OPEN_STATUSES: &[&str] = &["SCHEDULED", "TIMED"];

// ---------------------------------------------------------------------------
// API response types (football-data JSON → Rust)
// ---------------------------------------------------------------------------

/// Response from `/v4/matches`; we only deserialize the fields we need.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMatch {
    id: u32,

    /// Kickoff instant, RFC 3339 in UTC.
    utc_date: DateTime<Utc>,

    /// "SCHEDULED", "TIMED", "IN_PLAY", "FINISHED", ...
    status: String,

    #[serde(default)]
    competition: Option<ApiCompetition>,

    home_team: ApiTeam,
    away_team: ApiTeam,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCompetition {
    /// Short code, e.g. "PL" or "CL".
    #[serde(default)]
    code: Option<String>,
}

/// Team side of a fixture. Ids and names arrive as explicit nulls for
/// fixtures whose pairing is not yet known (cup draws), so everything
/// is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTeam {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// football-data.org catalog client.
pub struct FootballDataClient {
    http: Client,
    api_token: SecretString,
    ratings: TeamRatings,
}

impl FootballDataClient {
    /// Create a new client. The token is the account token issued by
    /// football-data.org; ratings come from configuration.
    pub fn new(api_token: SecretString, ratings: TeamRatings) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("MATCHBOOK/0.1.0 (fixture-wagering-core)")
            .build()
            .context("Failed to build HTTP client for football-data")?;

        Ok(Self {
            http,
            api_token,
            ratings,
        })
    }

    // -- Internal helpers ------------------------------------------------

    /// Whether a provider status still accepts wagers.
    fn is_open(status: &str) -> bool {
        OPEN_STATUSES.contains(&status)
    }

    /// Convert an API fixture to the matchbook `Match`, attaching ratings
    /// and display odds. Returns `None` for fixtures whose pairing is not
    /// yet known (a side without a name).
    fn to_match(&self, m: ApiMatch) -> Option<Match> {
        let home_name = m.home_team.name?;
        let away_name = m.away_team.name?;

        let home_rating = self.ratings.rating_for(&home_name);
        let away_rating = self.ratings.rating_for(&away_name);

        let home = Team {
            id: m.home_team.id.unwrap_or_default(),
            name: home_name,
            rating: home_rating,
        };
        let away = Team {
            id: m.away_team.id.unwrap_or_default(),
            name: away_name,
            rating: away_rating,
        };

        let odds = compute_odds(&home, &away);

        Some(Match {
            id: m.id,
            home,
            away,
            kickoff: m.utc_date,
            competition: m.competition.and_then(|c| c.code),
            odds: Some(odds),
        })
    }
}

// ---------------------------------------------------------------------------
// MatchCatalog trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl MatchCatalog for FootballDataClient {
    /// Fetch open fixtures in the date window for the given competitions.
    async fn matches_between(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        competitions: &[String],
    ) -> Result<Vec<Match>> {
        let url = format!("{BASE_URL}/matches");

        let mut query = vec![
            ("dateFrom".to_string(), date_from.to_string()),
            ("dateTo".to_string(), date_to.to_string()),
        ];
        if !competitions.is_empty() {
            query.push(("competitions".to_string(), competitions.join(",")));
        }

        debug!(from = %date_from, to = %date_to, "Fetching football-data fixtures");

        let resp = self
            .http
            .get(&url)
            .query(&query)
            .header(AUTH_HEADER, self.api_token.expose_secret())
            .send()
            .await
            .context("football-data fixtures request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("football-data API error {status}: {body}");
        }

        let payload: MatchesResponse = resp
            .json()
            .await
            .context("Failed to parse football-data fixtures response")?;

        let mut fixtures = Vec::new();
        for m in payload.matches {
            if !Self::is_open(&m.status) {
                continue;
            }
            if let Some(fixture) = self.to_match(m) {
                fixtures.push(fixture);
            }
        }

        info!(
            total = fixtures.len(),
            from = %date_from,
            to = %date_to,
            "football-data fixture scan complete"
        );

        Ok(fixtures)
    }

    /// Resolve a single fixture by provider id.
    ///
    /// Returns the fixture regardless of status; whether it can still take
    /// wagers is the ledger's kickoff check, not a catalog concern.
    async fn match_by_id(&self, id: u32) -> Result<Option<Match>> {
        let url = format!("{BASE_URL}/matches/{id}");

        let resp = self
            .http
            .get(&url)
            .header(AUTH_HEADER, self.api_token.expose_secret())
            .send()
            .await
            .context("football-data match detail request failed")?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(match_id = id, "football-data has no such fixture");
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("football-data match detail failed {status}: {body}");
        }

        let m: ApiMatch = resp
            .json()
            .await
            .context("Failed to parse football-data match detail")?;

        Ok(self.to_match(m))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
