//! SQLite-backed account store.
//!
//! Two tables: accounts and wagers. The wager commit runs as a single
//! transaction whose debit is conditional on the live balance, so
//! concurrent commits can never overdraw an account or leave a wager
//! without its debit.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{AccountStore, CommitOutcome, StoreError};
use crate::types::{Account, Odds, Wager};

/// SQLite-backed account store.
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

impl SqliteAccountStore {
    /// Open the database at `url` (creating it if missing) and ensure the
    /// schema exists. URLs look like `sqlite://matchbook.db`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Unavailable(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("failed to open database: {e}")))?;

        let store = Self { pool };
        store.init_schema().await?;

        info!(url, "Account store ready");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id      TEXT PRIMARY KEY,
                balance INTEGER NOT NULL CHECK (balance >= 0)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        // Odds and payouts are stored as canonical decimal strings;
        // SQLite has no exact decimal type.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS wagers (
                id               TEXT PRIMARY KEY,
                account_id       TEXT NOT NULL REFERENCES accounts(id),
                match_id         INTEGER NOT NULL,
                stake            INTEGER NOT NULL CHECK (stake > 0),
                bet_type         TEXT NOT NULL,
                odds_home_win    TEXT NOT NULL,
                odds_draw        TEXT NOT NULL,
                odds_away_win    TEXT NOT NULL,
                potential_payout TEXT NOT NULL,
                settled          INTEGER NOT NULL DEFAULT 0,
                placed_at        TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    /// Create an account with an opening balance. Setup surface for the
    /// embedding application; the ledger never provisions accounts.
    pub async fn create_account(&self, id: &str, opening_balance: i64) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO accounts (id, balance) VALUES (?1, ?2)")
            .bind(id)
            .bind(opening_balance)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        info!(account_id = %id, opening_balance, "Account created");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AccountStore trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn get_account(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT id, balance FROM accounts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| Account {
            id: r.get("id"),
            balance: r.get("balance"),
        }))
    }

    async fn commit_wager(&self, wager: &Wager) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Conditional debit: the balance check and the subtraction are one
        // statement, so no concurrent commit can slip between them.
        let debit =
            sqlx::query("UPDATE accounts SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1")
                .bind(wager.stake)
                .bind(&wager.account_id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

        if debit.rows_affected() == 0 {
            // Distinguish a vanished account from an uncovered stake,
            // still inside the transaction. Dropping the transaction
            // rolls it back; nothing was written.
            let row = sqlx::query("SELECT balance FROM accounts WHERE id = ?1")
                .bind(&wager.account_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;

            return Ok(match row {
                Some(r) => CommitOutcome::InsufficientFunds {
                    balance: r.get("balance"),
                },
                None => CommitOutcome::AccountMissing,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO wagers (
                id, account_id, match_id, stake, bet_type,
                odds_home_win, odds_draw, odds_away_win,
                potential_payout, settled, placed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(wager.id.to_string())
        .bind(&wager.account_id)
        .bind(wager.match_id)
        .bind(wager.stake)
        .bind(wager.bet_type.as_str())
        .bind(wager.odds.home_win.to_string())
        .bind(wager.odds.draw.to_string())
        .bind(wager.odds.away_win.to_string())
        .bind(wager.potential_payout.to_string())
        .bind(wager.settled)
        .bind(wager.placed_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let row = sqlx::query("SELECT balance FROM accounts WHERE id = ?1")
            .bind(&wager.account_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let balance_after: i64 = row.get("balance");

        tx.commit().await.map_err(map_sqlx_error)?;

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
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, match_id, stake, bet_type,
                   odds_home_win, odds_draw, odds_away_win,
                   potential_payout, settled, placed_at
            FROM wagers
            WHERE account_id = ?1
            ORDER BY placed_at DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_wager).collect()
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// SQLITE_BUSY and lock contention are retryable; everything else is not.
fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) => {
            let msg = db.message().to_lowercase();
            if msg.contains("locked") || msg.contains("busy") {
                StoreError::Conflict(db.message().to_string())
            } else {
                StoreError::Unavailable(e.to_string())
            }
        }
        _ => StoreError::Unavailable(e.to_string()),
    }
}

fn row_to_wager(row: &SqliteRow) -> Result<Wager, StoreError> {
    let id: String = row.get("id");
    let bet_type: String = row.get("bet_type");
    let placed_at: String = row.get("placed_at");

    Ok(Wager {
        id: Uuid::parse_str(&id)
            .map_err(|e| StoreError::Unavailable(format!("corrupt wager id {id:?}: {e}")))?,
        account_id: row.get("account_id"),
        match_id: row.get("match_id"),
        stake: row.get("stake"),
        bet_type: bet_type
            .parse()
            .map_err(|_| StoreError::Unavailable(format!("corrupt bet_type {bet_type:?}")))?,
        odds: Odds {
            home_win: parse_decimal(row, "odds_home_win")?,
            draw: parse_decimal(row, "odds_draw")?,
            away_win: parse_decimal(row, "odds_away_win")?,
        },
        potential_payout: parse_decimal(row, "potential_payout")?,
        settled: row.get("settled"),
        placed_at: DateTime::parse_from_rfc3339(&placed_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Unavailable(format!("corrupt placed_at {placed_at:?}: {e}")))?,
    })
}

fn parse_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, StoreError> {
    let raw: String = row.get(column);
    raw.parse()
        .map_err(|e| StoreError::Unavailable(format!("corrupt {column} {raw:?}: {e}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
