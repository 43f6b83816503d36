//! Wager ledger.
//!
//! Validates wager requests in contract order, derives odds at commit
//! time, and drives the store's atomic debit-and-record commit, retrying
//! a bounded number of times when a commit loses a race.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::MatchCatalog;
use crate::odds::compute_odds;
use crate::store::{AccountStore, CommitOutcome, StoreError};
use crate::types::{Account, BetType, Match, Wager, WagerError, WagerRequest};

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Maximum attempts for a commit that keeps losing races.
    pub max_commit_attempts: u32,
    /// Ceiling on any single catalog or store call.
    pub collaborator_timeout: std::time::Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: 3,
            collaborator_timeout: std::time::Duration::from_secs(10),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Places wagers against the account store, consulting the fixture
/// catalog for match state and the odds engine for pricing.
pub struct WagerLedger {
    catalog: Arc<dyn MatchCatalog>,
    store: Arc<dyn AccountStore>,
    config: LedgerConfig,
}

/// Attempt-level failure: conflicts are retried by the placement loop,
/// everything else surfaces as-is.
enum AttemptError {
    Conflict,
    Fatal(WagerError),
}

impl WagerLedger {
    pub fn new(catalog: Arc<dyn MatchCatalog>, store: Arc<dyn AccountStore>) -> Self {
        Self::with_config(catalog, store, LedgerConfig::default())
    }

    pub fn with_config(
        catalog: Arc<dyn MatchCatalog>,
        store: Arc<dyn AccountStore>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    /// Place a wager.
    ///
    /// Preconditions are checked in contract order before any mutation:
    /// bet type, stake, match existence, kickoff, account existence,
    /// funds. The commit itself re-checks funds inside the store's atomic
    /// unit, so a request that passes the precondition read can still
    /// come back as `InsufficientFunds` under concurrency. Commit
    /// conflicts are retried with fresh match and balance reads, up to
    /// the configured attempt cap.
    ///
    /// On success the returned wager carries the odds snapshot and
    /// potential payout fixed at commit time. On failure no state has
    /// changed: no debit without its wager, no wager without its debit.
    pub async fn place_wager(&self, request: &WagerRequest) -> Result<Wager, WagerError> {
        let bet_type: BetType = request.bet_type.parse()?;

        if request.stake <= 0 {
            debug!(
                account_id = %request.account_id,
                stake = request.stake,
                "Rejected non-positive stake"
            );
            return Err(WagerError::InvalidStake(request.stake));
        }

        let mut attempts = 0;
        loop {
            attempts += 1;

            match self.attempt(request, bet_type).await {
                Ok(wager) => return Ok(wager),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Conflict) => {
                    if attempts >= self.config.max_commit_attempts {
                        warn!(
                            account_id = %request.account_id,
                            match_id = request.match_id,
                            attempts,
                            "Commit conflict persisted, giving up"
                        );
                        return Err(WagerError::ConcurrencyConflict { attempts });
                    }
                    warn!(
                        account_id = %request.account_id,
                        match_id = request.match_id,
                        attempt = attempts,
                        "Commit conflict, retrying"
                    );
                }
            }
        }
    }

    /// One placement attempt: resolve collaborator state, validate, and
    /// drive the atomic commit.
    async fn attempt(
        &self,
        request: &WagerRequest,
        bet_type: BetType,
    ) -> Result<Wager, AttemptError> {
        // The fixture is re-read on every attempt: kickoff may pass and
        // the ratings feeding the odds may change between retries.
        let fixture = self
            .resolve_match(request.match_id)
            .await
            .map_err(AttemptError::Fatal)?;

        let now = Utc::now();
        if fixture.has_kicked_off(now) {
            debug!(
                match_id = fixture.id,
                kickoff = %fixture.kickoff,
                "Rejected wager on started match"
            );
            return Err(AttemptError::Fatal(WagerError::MatchAlreadyStarted {
                match_id: fixture.id,
                kickoff: fixture.kickoff,
            }));
        }

        let account = self
            .resolve_account(&request.account_id)
            .await
            .map_err(AttemptError::Fatal)?;

        if !account.can_cover(request.stake) {
            debug!(
                account_id = %account.id,
                stake = request.stake,
                balance = account.balance,
                "Rejected uncovered stake"
            );
            return Err(AttemptError::Fatal(WagerError::InsufficientFunds {
                needed: request.stake,
                available: account.balance,
            }));
        }

        // Odds are derived fresh at commit time, never pinned from an
        // earlier display read.
        let odds = compute_odds(&fixture.home, &fixture.away);
        let wager = Wager {
            id: Uuid::new_v4(),
            account_id: request.account_id.clone(),
            match_id: fixture.id,
            stake: request.stake,
            bet_type,
            odds,
            potential_payout: odds.payout(bet_type, request.stake),
            settled: false,
            placed_at: now,
        };

        let committed = timeout(
            self.config.collaborator_timeout,
            self.store.commit_wager(&wager),
        )
        .await;

        let outcome = match committed {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(StoreError::Conflict(msg))) => {
                debug!(match_id = wager.match_id, error = %msg, "Store reported commit conflict");
                return Err(AttemptError::Conflict);
            }
            Ok(Err(StoreError::Unavailable(msg))) => {
                warn!(account_id = %wager.account_id, error = %msg, "Store unavailable during commit");
                return Err(AttemptError::Fatal(WagerError::AccountUnavailable(msg)));
            }
            Err(_) => {
                warn!(account_id = %wager.account_id, "Store commit timed out");
                return Err(AttemptError::Fatal(WagerError::AccountUnavailable(
                    format!(
                        "commit timed out after {:?}",
                        self.config.collaborator_timeout
                    ),
                )));
            }
        };

        match outcome {
            CommitOutcome::Committed { balance_after } => {
                info!(
                    account_id = %wager.account_id,
                    wager_id = %wager.id,
                    match_id = wager.match_id,
                    bet_type = %wager.bet_type,
                    stake = wager.stake,
                    odds = %wager.odds,
                    payout = %wager.potential_payout,
                    balance_after,
                    "Wager placed"
                );
                Ok(wager)
            }
            CommitOutcome::InsufficientFunds { balance } => {
                // The precondition read passed but the live balance moved
                // underneath us. The store wrote nothing.
                debug!(
                    account_id = %wager.account_id,
                    stake = wager.stake,
                    balance,
                    "Commit refused: live balance no longer covers stake"
                );
                Err(AttemptError::Fatal(WagerError::InsufficientFunds {
                    needed: wager.stake,
                    available: balance,
                }))
            }
            CommitOutcome::AccountMissing => Err(AttemptError::Fatal(
                WagerError::AccountNotFound(request.account_id.clone()),
            )),
        }
    }

    /// Resolve the fixture, bounding the catalog call by the configured
    /// timeout.
    async fn resolve_match(&self, match_id: u32) -> Result<Match, WagerError> {
        let lookup = timeout(
            self.config.collaborator_timeout,
            self.catalog.match_by_id(match_id),
        )
        .await;

        match lookup {
            Ok(Ok(Some(fixture))) => Ok(fixture),
            Ok(Ok(None)) => Err(WagerError::MatchNotFound(match_id)),
            Ok(Err(e)) => {
                warn!(match_id, error = %e, "Catalog lookup failed");
                Err(WagerError::MatchDataUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(match_id, "Catalog lookup timed out");
                Err(WagerError::MatchDataUnavailable(format!(
                    "catalog timed out after {:?}",
                    self.config.collaborator_timeout
                )))
            }
        }
    }

    /// Resolve the account, bounding the store call by the configured
    /// timeout.
    async fn resolve_account(&self, account_id: &str) -> Result<Account, WagerError> {
        let lookup = timeout(
            self.config.collaborator_timeout,
            self.store.get_account(account_id),
        )
        .await;

        match lookup {
            Ok(Ok(Some(account))) => Ok(account),
            Ok(Ok(None)) => Err(WagerError::AccountNotFound(account_id.to_string())),
            Ok(Err(e)) => {
                warn!(account_id, error = %e, "Account lookup failed");
                Err(WagerError::AccountUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(account_id, "Account lookup timed out");
                Err(WagerError::AccountUnavailable(format!(
                    "account lookup timed out after {:?}",
                    self.config.collaborator_timeout
                )))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
