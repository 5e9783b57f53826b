use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::{debug, instrument};

use crate::error::Result;

/// The external authority deciding whether a user may consume one more
/// model invocation.
///
/// `Ok(false)` means the balance is insufficient: terminal for the task,
/// never retried. `Err(_)` is a transient store failure, a distinct kind.
#[async_trait]
pub trait CreditGate: Send + Sync {
    /// Deduct one query's cost for `user_id`. Returns whether it was granted.
    async fn deduct(&self, user_id: &str) -> Result<bool>;

    /// Current balance for `user_id`. Accounts are created lazily, so an
    /// unknown user reports the starting balance.
    async fn balance(&self, user_id: &str) -> Result<i64>;
}

/// SQLite-backed credit ledger.
///
/// Wraps a single connection in a `Mutex`. Deductions arrive serialized
/// through the pipeline's one worker, so contention is negligible.
pub struct SqliteLedger {
    db: Mutex<Connection>,
    starting_balance: i64,
    query_cost: i64,
}

impl SqliteLedger {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection, starting_balance: i64, query_cost: i64) -> Self {
        Self {
            db: Mutex::new(conn),
            starting_balance,
            query_cost,
        }
    }

    /// Insert the account row at the starting balance if it does not exist.
    fn ensure_account(&self, db: &Connection, user_id: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        db.execute(
            "INSERT OR IGNORE INTO credits (user_id, balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            rusqlite::params![user_id, self.starting_balance, now],
        )?;
        Ok(())
    }
}

#[async_trait]
impl CreditGate for SqliteLedger {
    #[instrument(skip(self))]
    async fn deduct(&self, user_id: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        self.ensure_account(&db, user_id)?;

        // Balance check and deduction are a single conditional UPDATE.
        let now = chrono::Utc::now().to_rfc3339();
        let rows_changed = db.execute(
            "UPDATE credits
             SET balance = balance - ?1, updated_at = ?2
             WHERE user_id = ?3 AND balance >= ?1",
            rusqlite::params![self.query_cost, now, user_id],
        )?;

        let granted = rows_changed > 0;
        debug!(granted, "credit deduction");
        Ok(granted)
    }

    #[instrument(skip(self))]
    async fn balance(&self, user_id: &str) -> Result<i64> {
        let db = self.db.lock().unwrap();
        self.ensure_account(&db, user_id)?;

        let balance = db.query_row(
            "SELECT balance FROM credits WHERE user_id = ?1",
            rusqlite::params![user_id],
            |row| row.get(0),
        )?;
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn ledger(starting: i64, cost: i64) -> SqliteLedger {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        SqliteLedger::new(conn, starting, cost)
    }

    #[tokio::test]
    async fn deducts_until_exhausted() {
        let gate = ledger(2, 1);
        assert!(gate.deduct("u1").await.unwrap());
        assert!(gate.deduct("u1").await.unwrap());
        assert!(!gate.deduct("u1").await.unwrap());
        assert_eq!(gate.balance("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn refusal_does_not_change_balance() {
        let gate = ledger(1, 5);
        assert!(!gate.deduct("u1").await.unwrap());
        assert_eq!(gate.balance("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unknown_user_reports_starting_balance() {
        let gate = ledger(10, 1);
        assert_eq!(gate.balance("nobody").await.unwrap(), 10);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let gate = ledger(1, 1);
        assert!(gate.deduct("a").await.unwrap());
        assert!(gate.deduct("b").await.unwrap());
        assert!(!gate.deduct("a").await.unwrap());
    }
}
