// ABOUTME: Transaction management with RAII guards and retry for SQLite write contention
// ABOUTME: Provides automatic rollback on drop and exponential backoff on locked databases
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction helpers
//!
//! - [`TransactionGuard`]: rolls back automatically unless `commit()` is reached
//! - [`retry_transaction`]: re-runs an operation that hit `SQLite` lock contention,
//!   judged from the attached `sqlx::Error`
//!
//! ```text
//! let mut guard = TransactionGuard::new(pool.begin().await?);
//! sqlx::query("INSERT INTO chat_messages ...").execute(guard.executor()?).await?;
//! sqlx::query("UPDATE rooms ...").execute(guard.executor()?).await?;
//! guard.commit().await?;
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Retry `f` while it fails with a transient locking error
///
/// Backoff doubles from 20ms. Non-retryable errors are returned at once.
///
/// # Errors
///
/// Returns the last error once `max_attempts` is reached, or the first
/// non-retryable error
pub async fn retry_transaction<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= max_attempts || !is_retryable_error(&e) {
                    error!(attempts, error = %e, "Transaction failed");
                    return Err(e);
                }
                let backoff_ms = 10 * (1_u64 << attempts);
                warn!(
                    attempt = attempts,
                    backoff_ms,
                    error = %e,
                    "Transaction hit lock contention, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Transient `SQLite` conditions worth another attempt
///
/// Only the attached `sqlx::Error` is inspected; message text may carry
/// caller-supplied ids and is never matched.
fn is_retryable_error(error: &AppError) -> bool {
    error
        .source
        .as_deref()
        .and_then(|source| source.downcast_ref::<sqlx::Error>())
        .is_some_and(is_transient_sqlx_error)
}

fn is_transient_sqlx_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            // Extended result codes keep the primary code in the low byte
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// RAII guard that rolls the wrapped transaction back unless committed
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    committed: bool,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Wrap a transaction obtained from `pool.begin()`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>) -> Self {
        Self {
            transaction: Some(transaction),
            committed: false,
        }
    }

    /// Commit and consume the guard
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails or the transaction was already consumed
    pub async fn commit(mut self) -> AppResult<()> {
        let tx = self
            .transaction
            .take()
            .ok_or_else(|| AppError::internal("Transaction already consumed - cannot commit"))?;
        tx.commit()
            .await
            .map_err(|e| {
                AppError::database(format!("Transaction commit failed: {e}")).with_source(e)
            })?;
        self.committed = true;
        debug!("Transaction committed");
        Ok(())
    }

    /// Connection to run queries against inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the guard was already committed or rolled back
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        self.transaction.as_deref_mut().ok_or_else(|| {
            AppError::internal("Transaction already consumed - guard used after commit/rollback")
        })
    }
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() && !self.committed {
            warn!("Transaction dropped without commit, rolling back");
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;
