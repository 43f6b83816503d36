//! Shared types for the MATCHBOOK wagering core.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that catalog, store, and
//! ledger modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Teams & matches
// ---------------------------------------------------------------------------

/// A team as served by the fixture catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    /// Coarse strength rating on a small integer scale.
    /// Immutable once loaded; the catalog resolves it from configuration.
    pub rating: i32,
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rating {})", self.name, self.rating)
    }
}

/// A scheduled fixture between two teams.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: u32,
    pub home: Team,
    pub away: Team,
    /// Kickoff instant in UTC. Local-time conversion is a display concern.
    pub kickoff: DateTime<Utc>,
    /// Competition code as served by the catalog, e.g. "PL" or "CL".
    pub competition: Option<String>,
    /// Display odds derived when the fixture was loaded. Transient: the
    /// ledger recomputes odds at commit time and never reads this field.
    pub odds: Option<Odds>,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} vs {} (kickoff {})",
            self.id,
            self.home.name,
            self.away.name,
            self.kickoff.format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

impl Match {
    /// Whether the fixture has already kicked off (and so cannot accept
    /// new wagers).
    pub fn has_kicked_off(&self, now: DateTime<Utc>) -> bool {
        self.kickoff <= now
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

/// A three-way odds tuple: the payout multiplier for each outcome.
/// Every multiplier is strictly greater than 1.0. Produced only by the
/// odds engine; immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Odds {
    pub home_win: Decimal,
    pub draw: Decimal,
    pub away_win: Decimal,
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "1: {:.2} | X: {:.2} | 2: {:.2}",
            self.home_win, self.draw, self.away_win,
        )
    }
}

impl Odds {
    /// The multiplier applied to a stake on the given outcome.
    pub fn price_for(&self, bet_type: BetType) -> Decimal {
        match bet_type {
            BetType::HomeWin => self.home_win,
            BetType::Draw => self.draw,
            BetType::AwayWin => self.away_win,
        }
    }

    /// Payout if the given outcome lands: stake × multiplier.
    pub fn payout(&self, bet_type: BetType, stake: i64) -> Decimal {
        Decimal::from(stake) * self.price_for(bet_type)
    }
}

// ---------------------------------------------------------------------------
// Bet type
// ---------------------------------------------------------------------------

/// The three-way outcome a wager backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetType {
    HomeWin,
    Draw,
    AwayWin,
}

impl BetType {
    /// All outcomes (useful for iteration).
    pub const ALL: &'static [BetType] = &[BetType::HomeWin, BetType::Draw, BetType::AwayWin];

    /// Canonical spelling, as stored and accepted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BetType::HomeWin => "HomeWin",
            BetType::Draw => "Draw",
            BetType::AwayWin => "AwayWin",
        }
    }
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a string into a BetType (case-insensitive).
/// Accepts the canonical spellings plus the usual 1X2 shorthand.
impl std::str::FromStr for BetType {
    type Err = WagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "homewin" | "home_win" | "home" | "1" => Ok(BetType::HomeWin),
            "draw" | "x" => Ok(BetType::Draw),
            "awaywin" | "away_win" | "away" | "2" => Ok(BetType::AwayWin),
            _ => Err(WagerError::InvalidBetType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts & wagers
// ---------------------------------------------------------------------------

/// A user's points account. Owned by the account store; the balance is
/// mutated only through the ledger's atomic commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    /// Whole points, never negative.
    pub balance: i64,
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} pts", self.id, self.balance)
    }
}

impl Account {
    /// Whether the balance covers the given stake.
    pub fn can_cover(&self, stake: i64) -> bool {
        self.balance >= stake
    }
}

/// A committed wager. The odds snapshot and potential payout are fixed at
/// commit time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wager {
    pub id: Uuid,
    pub account_id: String,
    pub match_id: u32,
    /// Points staked; positive, at most the balance at commit time.
    pub stake: i64,
    pub bet_type: BetType,
    /// Full three-way tuple as it stood when the wager was committed.
    pub odds: Odds,
    /// stake × odds for the backed outcome, fixed at commit.
    pub potential_payout: Decimal,
    /// Always false in this core; settlement happens elsewhere.
    pub settled: bool,
    pub placed_at: DateTime<Utc>,
}

impl fmt::Display for Wager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} pts on {} (match #{}, pays {:.2})",
            self.account_id, self.stake, self.bet_type, self.match_id, self.potential_payout,
        )
    }
}

/// A request to place a wager, as received from the caller. The bet type
/// arrives as free text and is validated by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerRequest {
    pub account_id: String,
    pub match_id: u32,
    pub stake: i64,
    pub bet_type: String,
}

impl fmt::Display for WagerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} pts on {:?} (match #{})",
            self.account_id, self.stake, self.bet_type, self.match_id,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for wager placement. All are per-request;
/// none is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum WagerError {
    #[error("Unrecognised bet type: {0:?}")]
    InvalidBetType(String),

    #[error("Invalid stake: {0} (stake must be a positive whole number of points)")]
    InvalidStake(i64),

    #[error("Match not found: {0}")]
    MatchNotFound(u32),

    #[error("Match {match_id} already started (kickoff was {kickoff})")]
    MatchAlreadyStarted {
        match_id: u32,
        kickoff: DateTime<Utc>,
    },

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Insufficient funds: need {needed} pts, have {available} pts")]
    InsufficientFunds { needed: i64, available: i64 },

    #[error("Commit conflict persisted after {attempts} attempts")]
    ConcurrencyConflict { attempts: u32 },

    #[error("Match data unavailable: {0}")]
    MatchDataUnavailable(String),

    #[error("Account store unavailable: {0}")]
    AccountUnavailable(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
