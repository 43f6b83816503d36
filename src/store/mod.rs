//! Account stores.
//!
//! Defines the `AccountStore` trait: balance lookup, wager history, and
//! the atomic debit-and-record commit the ledger depends on. Two
//! implementations: SQLite for durable deployments, in-memory for play
//! points and deterministic tests.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::types::{Account, Wager};

// ---------------------------------------------------------------------------
// Commit outcome
// ---------------------------------------------------------------------------

/// Outcome of an attempted wager commit.
///
/// Existence and funds are re-checked inside the store's atomic unit, so
/// the commit reports them as outcomes instead of trusting the ledger's
/// earlier precondition reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Balance debited and wager recorded, both in one atomic unit.
    Committed { balance_after: i64 },
    /// The live balance no longer covers the stake. Nothing was written.
    InsufficientFunds { balance: i64 },
    /// The account vanished between lookup and commit. Nothing was written.
    AccountMissing,
}

/// Store-level failures, kept distinct from domain errors so the ledger
/// can decide retry policy per variant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The commit lost a race (database busy/locked). Retryable.
    #[error("Store conflict: {0}")]
    Conflict(String),

    /// The store cannot be reached or failed in a non-retryable way.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Store trait
// ---------------------------------------------------------------------------

/// Abstraction over the account and wager persistence backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Look up an account by id.
    async fn get_account(&self, id: &str) -> Result<Option<Account>, StoreError>;

    /// Atomically debit `wager.stake` from the account and record the
    /// wager. The two writes succeed or fail together; the balance check
    /// happens inside the same atomic unit as the debit.
    async fn commit_wager(&self, wager: &Wager) -> Result<CommitOutcome, StoreError>;

    /// A user's wagers, newest first.
    async fn wagers_for_account(&self, id: &str) -> Result<Vec<Wager>, StoreError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
