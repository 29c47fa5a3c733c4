// SQLite implementation of ListingStore
//
// Listings live in the `listings` table, times as epoch milliseconds, the
// item payload as base64 text. Active/expired scans use the expiration index.

use crate::core::auction::{AuctionError, ItemPayload, Listing, ListingId, ListingStore, NewListing};
use crate::infra::database::{Database, DbError};
use crate::infra::economy::ledger_queries::{balance_of, credit, debit, ensure_account};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

impl From<DbError> for AuctionError {
    fn from(err: DbError) -> Self {
        AuctionError::Storage(err.to_string())
    }
}

fn storage(err: sqlx::Error) -> AuctionError {
    AuctionError::from(DbError::from(err))
}

pub struct SqliteListingStore {
    db: Arc<Database>,
}

impl SqliteListingStore {
    /// Create a listing store on an already-migrated database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn fail(&self, err: sqlx::Error) -> AuctionError {
        AuctionError::from(self.db.classify(err))
    }

    fn collect_rows(rows: Vec<SqliteRow>) -> Vec<Listing> {
        rows.iter()
            .filter_map(|row| match row_to_listing(row) {
                Ok(listing) => Some(listing),
                Err(e) => {
                    tracing::warn!("Skipping unreadable listing row: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl ListingStore for SqliteListingStore {
    async fn create(&self, listing: NewListing) -> Result<Listing, AuctionError> {
        let row = sqlx::query(
            r#"
            INSERT INTO listings (seller_uuid, item_data, price, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(listing.seller.to_string())
        .bind(listing.payload.to_base64())
        .bind(listing.price)
        .bind(listing.created_at.timestamp_millis())
        .bind(listing.expires_at.timestamp_millis())
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| self.fail(e))?;

        Ok(Listing {
            id: ListingId(row.try_get::<i64, _>("id").map_err(storage)?),
            seller: listing.seller,
            payload: listing.payload,
            price: listing.price,
            created_at: listing.created_at,
            expires_at: listing.expires_at,
            current_bidder: None,
            current_bid: None,
        })
    }

    async fn get(&self, id: ListingId) -> Result<Option<Listing>, AuctionError> {
        let row = sqlx::query("SELECT * FROM listings WHERE id = ?")
            .bind(id.0)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| self.fail(e))?;

        row.as_ref().map(row_to_listing).transpose()
    }

    async fn list_active(
        &self,
        now: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Listing>, AuctionError> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM listings
            WHERE expires_at >= ?
            ORDER BY expires_at ASC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(now.timestamp_millis())
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| self.fail(e))?;

        Ok(Self::collect_rows(rows))
    }

    async fn count_active(&self, now: DateTime<Utc>) -> Result<usize, AuctionError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM listings WHERE expires_at >= ?")
            .bind(now.timestamp_millis())
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| self.fail(e))?;

        Ok(row.try_get::<i64, _>("count").map_err(storage)? as usize)
    }

    async fn list_by_seller(&self, seller: Uuid) -> Result<Vec<Listing>, AuctionError> {
        let rows = sqlx::query(
            "SELECT * FROM listings WHERE seller_uuid = ? ORDER BY expires_at ASC, id ASC",
        )
        .bind(seller.to_string())
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| self.fail(e))?;

        Ok(Self::collect_rows(rows))
    }

    async fn count_by_seller(&self, seller: Uuid) -> Result<usize, AuctionError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM listings WHERE seller_uuid = ?")
            .bind(seller.to_string())
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| self.fail(e))?;

        Ok(row.try_get::<i64, _>("count").map_err(storage)? as usize)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AuctionError> {
        let rows = sqlx::query(
            "SELECT * FROM listings WHERE expires_at < ? ORDER BY expires_at ASC, id ASC",
        )
        .bind(now.timestamp_millis())
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| self.fail(e))?;

        Ok(Self::collect_rows(rows))
    }

    async fn delete(&self, id: ListingId) -> Result<bool, AuctionError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id.0)
            .execute(self.db.pool())
            .await
            .map_err(|e| self.fail(e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, AuctionError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM listings")
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| self.fail(e))?;

        Ok(row.try_get::<i64, _>("count").map_err(storage)? as usize)
    }

    async fn place_bid(
        &self,
        id: ListingId,
        bidder: Uuid,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, AuctionError> {
        let result = sqlx::query(
            r#"
            UPDATE listings
            SET current_bidder = ?, current_bid = ?
            WHERE id = ?
              AND expires_at >= ?
              AND seller_uuid <> ?
              AND ? > COALESCE(current_bid, price)
            "#,
        )
        .bind(bidder.to_string())
        .bind(amount)
        .bind(id.0)
        .bind(now.timestamp_millis())
        .bind(bidder.to_string())
        .bind(amount)
        .execute(self.db.pool())
        .await
        .map_err(|e| self.fail(e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn purchase(
        &self,
        id: ListingId,
        buyer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Listing, AuctionError> {
        let now_ms = now.timestamp_millis();

        self.db
            .transaction(move |conn| {
                Box::pin(async move {
                    // Delete first so the transaction holds the write lock from the start;
                    // any rejection below rolls the row back.
                    let row = sqlx::query("DELETE FROM listings WHERE id = ? RETURNING *")
                        .bind(id.0)
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(storage)?
                        .ok_or(AuctionError::NotFound(id))?;
                    let listing = row_to_listing(&row)?;

                    if listing.is_expired_at(now) {
                        return Err(AuctionError::Expired(id));
                    }
                    if listing.seller == buyer {
                        return Err(AuctionError::OwnListing);
                    }
                    if listing.payload.is_empty() {
                        return Err(AuctionError::CorruptItem(id));
                    }

                    ensure_account(conn, buyer, now_ms).await.map_err(storage)?;
                    if debit(conn, buyer, listing.price, now_ms)
                        .await
                        .map_err(storage)?
                        .is_none()
                    {
                        let available = balance_of(conn, buyer)
                            .await
                            .map_err(storage)?
                            .unwrap_or(0);
                        return Err(AuctionError::InsufficientFunds {
                            required: listing.price,
                            available,
                        });
                    }
                    if credit(conn, listing.seller, listing.price, now_ms)
                        .await
                        .map_err(storage)?
                        .is_none()
                    {
                        return Err(AuctionError::SellerBalanceFull(listing.price));
                    }

                    Ok(listing)
                })
            })
            .await
    }
}

fn row_to_listing(row: &SqliteRow) -> Result<Listing, AuctionError> {
    let id = ListingId(row.try_get::<i64, _>("id").map_err(storage)?);

    let seller_raw: String = row.try_get("seller_uuid").map_err(storage)?;
    let seller = Uuid::parse_str(&seller_raw)
        .map_err(|e| AuctionError::Storage(format!("listing {id} has bad seller id: {e}")))?;

    let item_data: String = row.try_get("item_data").map_err(storage)?;

    let bidder_raw: Option<String> = row.try_get("current_bidder").map_err(storage)?;
    let current_bidder = bidder_raw.and_then(|raw| match Uuid::parse_str(&raw) {
        Ok(bidder) => Some(bidder),
        Err(e) => {
            tracing::warn!("Ignoring bad bidder id on listing {}: {}", id, e);
            None
        }
    });

    Ok(Listing {
        id,
        seller,
        payload: ItemPayload::from_base64_lossy(&item_data),
        price: row.try_get("price").map_err(storage)?,
        created_at: millis_to_time(row.try_get("created_at").map_err(storage)?, id)?,
        expires_at: millis_to_time(row.try_get("expires_at").map_err(storage)?, id)?,
        current_bidder,
        current_bid: row.try_get("current_bid").map_err(storage)?,
    })
}

fn millis_to_time(ms: i64, id: ListingId) -> Result<DateTime<Utc>, AuctionError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| AuctionError::Storage(format!("listing {id} has bad timestamp {ms}")))
}
