// Balance statements shared by the ledger and the auction purchase.
//
// Each helper is a single statement on a borrowed connection so callers can
// compose them inside one transaction. Debits are conditional updates; the
// balance is never read and then written back.

use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use uuid::Uuid;

/// Create the account at 0 if it doesn't exist yet.
pub(crate) async fn ensure_account(
    conn: &mut SqliteConnection,
    id: Uuid,
    now_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO accounts (uuid, balance, updated_at)
        VALUES (?, 0, ?)
        ON CONFLICT(uuid) DO NOTHING
        "#,
    )
    .bind(id.to_string())
    .bind(now_ms)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(crate) async fn balance_of(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query("SELECT balance FROM accounts WHERE uuid = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    row.map(|row| row.try_get::<i64, _>("balance")).transpose()
}

/// Add `amount` (creating the account if needed). Returns the new balance.
///
/// Returns `None` when the sum would not fit in an i64; nothing changes.
/// `amount` must be non-negative.
pub(crate) async fn credit(
    conn: &mut SqliteConnection,
    id: Uuid,
    amount: i64,
    now_ms: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        INSERT INTO accounts (uuid, balance, updated_at)
        VALUES (?, ?, ?)
        ON CONFLICT(uuid) DO UPDATE SET
            balance = accounts.balance + excluded.balance,
            updated_at = excluded.updated_at
        WHERE accounts.balance <= ? - excluded.balance
        RETURNING balance
        "#,
    )
    .bind(id.to_string())
    .bind(amount)
    .bind(now_ms)
    .bind(i64::MAX)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|row| row.try_get::<i64, _>("balance")).transpose()
}

/// Subtract `amount` only if the balance covers it.
///
/// Returns the new balance, or `None` when funds are short (nothing changes).
pub(crate) async fn debit(
    conn: &mut SqliteConnection,
    id: Uuid,
    amount: i64,
    now_ms: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        UPDATE accounts
        SET balance = balance - ?, updated_at = ?
        WHERE uuid = ? AND balance >= ?
        RETURNING balance
        "#,
    )
    .bind(amount)
    .bind(now_ms)
    .bind(id.to_string())
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|row| row.try_get::<i64, _>("balance")).transpose()
}
