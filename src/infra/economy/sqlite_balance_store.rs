// SQLite implementation of the BalanceStore trait

use super::ledger_queries::{balance_of, credit, debit, ensure_account};
use crate::core::economy::{Account, BalanceStore, LedgerError};
use crate::infra::database::{Database, DbError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Row, Sqlite, SqliteConnection};
use std::sync::Arc;
use uuid::Uuid;

impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

fn storage(err: sqlx::Error) -> LedgerError {
    LedgerError::from(DbError::from(err))
}

/// Error for a credit the account can't hold.
async fn overflow(conn: &mut SqliteConnection, id: Uuid, amount: i64) -> LedgerError {
    match balance_of(conn, id).await {
        Ok(balance) => LedgerError::BalanceOverflow {
            balance: balance.unwrap_or(0),
            amount,
        },
        Err(e) => storage(e),
    }
}

pub struct SqliteBalanceStore {
    db: Arc<Database>,
}

impl SqliteBalanceStore {
    /// Create a balance store on an already-migrated database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, LedgerError> {
        self.db
            .pool()
            .acquire()
            .await
            .map_err(|e| LedgerError::from(self.db.classify(e)))
    }
}

#[async_trait]
impl BalanceStore for SqliteBalanceStore {
    async fn get_balance(&self, id: Uuid) -> Result<i64, LedgerError> {
        let mut conn = self.acquire().await?;

        if let Some(balance) = balance_of(&mut conn, id).await.map_err(storage)? {
            return Ok(balance);
        }

        // Create new account if it doesn't exist
        ensure_account(&mut conn, id, Utc::now().timestamp_millis())
            .await
            .map_err(storage)?;
        tracing::debug!("Created account {}", id);

        Ok(balance_of(&mut conn, id)
            .await
            .map_err(storage)?
            .unwrap_or(0))
    }

    async fn set_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        let stored = amount.max(0);

        sqlx::query(
            r#"
            INSERT INTO accounts (uuid, balance, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(uuid) DO UPDATE SET
                balance = excluded.balance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id.to_string())
        .bind(stored)
        .bind(Utc::now().timestamp_millis())
        .execute(self.db.pool())
        .await
        .map_err(|e| LedgerError::from(self.db.classify(e)))?;

        Ok(stored)
    }

    async fn add_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount(amount));
        }

        let mut conn = self.acquire().await?;
        match credit(&mut conn, id, amount, Utc::now().timestamp_millis())
            .await
            .map_err(storage)?
        {
            Some(balance) => Ok(balance),
            None => Err(overflow(&mut conn, id, amount).await),
        }
    }

    async fn remove_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount(amount));
        }

        let now_ms = Utc::now().timestamp_millis();
        let mut conn = self.acquire().await?;
        ensure_account(&mut conn, id, now_ms).await.map_err(storage)?;

        match debit(&mut conn, id, amount, now_ms).await.map_err(storage)? {
            Some(balance) => Ok(balance),
            None => {
                let available = balance_of(&mut conn, id)
                    .await
                    .map_err(storage)?
                    .unwrap_or(0);
                Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available,
                })
            }
        }
    }

    async fn transfer(&self, from: Uuid, to: Uuid, amount: i64) -> Result<(), LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount(amount));
        }

        let now_ms = Utc::now().timestamp_millis();
        self.db
            .transaction(move |conn| {
                Box::pin(async move {
                    ensure_account(conn, from, now_ms).await.map_err(storage)?;

                    if debit(conn, from, amount, now_ms)
                        .await
                        .map_err(storage)?
                        .is_none()
                    {
                        let available = balance_of(conn, from)
                            .await
                            .map_err(storage)?
                            .unwrap_or(0);
                        return Err(LedgerError::InsufficientFunds {
                            required: amount,
                            available,
                        });
                    }

                    if credit(conn, to, amount, now_ms)
                        .await
                        .map_err(storage)?
                        .is_none()
                    {
                        return Err(overflow(conn, to, amount).await);
                    }
                    Ok(())
                })
            })
            .await
    }

    async fn top_balances(&self, limit: usize) -> Result<Vec<Account>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT uuid, balance
            FROM accounts
            ORDER BY balance DESC, uuid ASC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| LedgerError::from(self.db.classify(e)))?;

        let mut accounts = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw: String = row.try_get("uuid").map_err(storage)?;
            let balance: i64 = row.try_get("balance").map_err(storage)?;
            match Uuid::parse_str(&raw) {
                Ok(id) => accounts.push(Account { id, balance }),
                Err(e) => tracing::warn!("Skipping account with bad id '{}': {}", raw, e),
            }
        }

        Ok(accounts)
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, LedgerError> {
        let result = sqlx::query("DELETE FROM accounts WHERE uuid = ?")
            .bind(id.to_string())
            .execute(self.db.pool())
            .await
            .map_err(|e| LedgerError::from(self.db.classify(e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::database::test_support::open_temp;

    #[tokio::test]
    async fn test_account_created_lazily_at_zero() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();

        assert_eq!(store.get_balance(id).await.unwrap(), 0);

        let top = store.top_balances(10).await.unwrap();
        assert_eq!(top, vec![Account { id, balance: 0 }]);
    }

    #[tokio::test]
    async fn test_sequential_adds_accumulate() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();

        store.add_balance(id, 10).await.unwrap();
        let balance = store.add_balance(id, 10).await.unwrap();

        assert_eq!(balance, 20);
        assert_eq!(store.get_balance(id).await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_overdraw_fails_and_keeps_balance() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();
        store.set_balance(id, 100).await.unwrap();

        let result = store.remove_balance(id, 150).await;

        assert_eq!(
            result,
            Err(LedgerError::InsufficientFunds {
                required: 150,
                available: 100
            })
        );
        assert_eq!(store.get_balance(id).await.unwrap(), 100);
        assert_eq!(store.remove_balance(id, 100).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_negative_amounts_leave_state_alone() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();
        store.set_balance(id, 40).await.unwrap();

        assert_eq!(
            store.add_balance(id, -1).await,
            Err(LedgerError::NegativeAmount(-1))
        );
        assert_eq!(
            store.remove_balance(id, -1).await,
            Err(LedgerError::NegativeAmount(-1))
        );
        assert_eq!(store.get_balance(id).await.unwrap(), 40);
    }

    #[tokio::test]
    async fn test_set_balance_clamps_to_zero() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();

        assert_eq!(store.set_balance(id, -25).await.unwrap(), 0);
        assert_eq!(store.get_balance(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transfer_is_all_or_nothing() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.set_balance(alice, 30).await.unwrap();

        let result = store.transfer(alice, bob, 50).await;
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { required: 50, .. })
        ));
        assert_eq!(store.get_balance(alice).await.unwrap(), 30);
        assert_eq!(store.get_balance(bob).await.unwrap(), 0);

        store.transfer(alice, bob, 30).await.unwrap();
        assert_eq!(store.get_balance(alice).await.unwrap(), 0);
        assert_eq!(store.get_balance(bob).await.unwrap(), 30);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let (_dir, db) = open_temp().await;
        let store = Arc::new(SqliteBalanceStore::new(Arc::new(db)));
        let id = Uuid::new_v4();
        store.set_balance(id, 100).await.unwrap();

        let tasks: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.remove_balance(id, 10).await })
            })
            .collect();

        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 10);
        assert_eq!(store.get_balance(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_credit_past_i64_max_is_refused() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let id = Uuid::new_v4();
        store.set_balance(id, i64::MAX).await.unwrap();

        assert_eq!(
            store.add_balance(id, 1).await,
            Err(LedgerError::BalanceOverflow {
                balance: i64::MAX,
                amount: 1
            })
        );
        assert_eq!(store.get_balance(id).await.unwrap(), i64::MAX);
        assert_eq!(store.add_balance(id, 0).await.unwrap(), i64::MAX);
        assert_eq!(store.top_balances(1).await.unwrap()[0].balance, i64::MAX);
    }

    #[tokio::test]
    async fn test_transfer_into_full_account_rolls_back() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.set_balance(alice, 50).await.unwrap();
        store.set_balance(bob, i64::MAX - 10).await.unwrap();

        assert!(matches!(
            store.transfer(alice, bob, 20).await,
            Err(LedgerError::BalanceOverflow { amount: 20, .. })
        ));
        assert_eq!(store.get_balance(alice).await.unwrap(), 50);
        assert_eq!(store.get_balance(bob).await.unwrap(), i64::MAX - 10);

        store.transfer(alice, bob, 10).await.unwrap();
        assert_eq!(store.get_balance(bob).await.unwrap(), i64::MAX);
    }

    #[tokio::test]
    async fn test_leaderboard_and_delete() {
        let (_dir, db) = open_temp().await;
        let store = SqliteBalanceStore::new(Arc::new(db));
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        store.set_balance(ids[0], 500).await.unwrap();
        store.set_balance(ids[1], 300).await.unwrap();
        store.set_balance(ids[2], 700).await.unwrap();

        let top = store.top_balances(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, ids[2]);
        assert_eq!(top[1].id, ids[0]);

        assert!(store.delete_account(ids[2]).await.unwrap());
        assert!(!store.delete_account(ids[2]).await.unwrap());
        assert_eq!(store.top_balances(10).await.unwrap().len(), 2);
    }
}
