//! In-memory account store.
//!
//! Backs play-points deployments and deterministic tests. A single mutex
//! guards accounts and wagers together, so the conditional debit and the
//! wager insert are atomic by construction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use super::{AccountStore, CommitOutcome, StoreError};
use crate::types::{Account, Wager};

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, i64>,
    wagers: Vec<Wager>,
}

/// Mutex-guarded in-memory account store.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account with an opening balance, replacing any existing
    /// account with the same id. Setup surface for tests and play-points
    /// deployments; the ledger never provisions accounts.
    pub fn create_account(&self, id: &str, opening_balance: i64) -> Result<(), StoreError> {
        let mut inner = self.locked()?;
        inner.accounts.insert(id.to_string(), opening_balance);
        Ok(())
    }

    fn locked(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("account store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_account(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.locked()?;
        Ok(inner.accounts.get(id).map(|balance| Account {
            id: id.to_string(),
            balance: *balance,
        }))
    }

    async fn commit_wager(&self, wager: &Wager) -> Result<CommitOutcome, StoreError> {
        // One guard spans the balance check, the debit, and the insert.
        let mut inner = self.locked()?;

        let balance = match inner.accounts.get_mut(&wager.account_id) {
            Some(b) => b,
            None => return Ok(CommitOutcome::AccountMissing),
        };

        if *balance < wager.stake {
            return Ok(CommitOutcome::InsufficientFunds { balance: *balance });
        }

        *balance -= wager.stake;
        let balance_after = *balance;
        inner.wagers.push(wager.clone());

        debug!(
            account_id = %wager.account_id,
            wager_id = %wager.id,
            stake = wager.stake,
            balance_after,
            "Wager committed"
        );

        Ok(CommitOutcome::Committed { balance_after })
    }

    async fn wagers_for_account(&self, id: &str) -> Result<Vec<Wager>, StoreError> {
        let inner = self.locked()?;
        let mut wagers: Vec<Wager> = inner
            .wagers
            .iter()
            .filter(|w| w.account_id == id)
            .cloned()
            .collect();
        // Newest first on placed_at, same ordering as the SQLite store.
        wagers.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(wagers)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
