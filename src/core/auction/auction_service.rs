// Auction house core - listing rules and lifecycle.
//
// Handles:
// - Validating new listings (price bounds, per-seller limit, duration)
// - Buying (delegated to the store so debit, credit and removal share a transaction)
// - Seller-initiated reclaim of expired listings and cancellation
// - Bids on active listings
// - Paging through the active board
//
// Item payloads are opaque here; the host decides what an item is.

use super::auction_models::{now_millis, Listing, ListingId, NewListing};
use super::item_payload::ItemPayload;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("Auction {0} not found")]
    NotFound(ListingId),

    #[error("Auction {0} has expired")]
    Expired(ListingId),

    #[error("Auction {0} has not expired yet")]
    NotExpired(ListingId),

    #[error("You cannot buy or bid on your own listing")]
    OwnListing,

    #[error("Only the seller can do that")]
    NotSeller,

    #[error("Price must be greater than 0 (got {0})")]
    InvalidPrice(i64),

    #[error("Price {price} is above the limit of {max}")]
    PriceTooHigh { price: i64, max: i64 },

    #[error("Listing limit reached ({current} >= {max})")]
    TooManyListings { current: usize, max: usize },

    #[error("Insufficient funds: need {required}, but only have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Bid of {bid} is too low, minimum is {minimum}")]
    BidTooLow { bid: i64, minimum: i64 },

    #[error("Item '{0}' cannot be sold")]
    Blacklisted(String),

    #[error("Cannot list an empty item")]
    EmptyItem,

    #[error("Listing duration is out of range")]
    InvalidDuration,

    #[error("Auction {0} holds an unreadable item and was removed")]
    CorruptItem(ListingId),

    #[error("The seller's balance can't take another {0}")]
    SellerBalanceFull(i64),

    #[error("Store error: {0}")]
    Storage(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting listings.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn create(&self, listing: NewListing) -> Result<Listing, AuctionError>;

    async fn get(&self, id: ListingId) -> Result<Option<Listing>, AuctionError>;

    /// Unexpired listings, soonest expiry first.
    async fn list_active(
        &self,
        now: DateTime<Utc>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Listing>, AuctionError>;

    async fn count_active(&self, now: DateTime<Utc>) -> Result<usize, AuctionError>;

    async fn list_by_seller(&self, seller: Uuid) -> Result<Vec<Listing>, AuctionError>;

    /// All of a seller's rows, expired ones included.
    async fn count_by_seller(&self, seller: Uuid) -> Result<usize, AuctionError>;

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AuctionError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: ListingId) -> Result<bool, AuctionError>;

    async fn count(&self) -> Result<usize, AuctionError>;

    /// Record a bid if the listing is still open and the bid beats the
    /// current one. Returns false when the conditions no longer hold.
    async fn place_bid(
        &self,
        id: ListingId,
        bidder: Uuid,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Result<bool, AuctionError>;

    /// Debit the buyer, credit the seller and remove the listing, all or nothing.
    /// A listing with an empty payload fails with `CorruptItem` before any money moves.
    async fn purchase(
        &self,
        id: ListingId,
        buyer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Listing, AuctionError>;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct AuctionConfig {
    pub max_price: i64,

    /// Rows a seller may hold at once, expired but unclaimed ones included.
    pub max_listings_per_seller: usize,

    pub listing_duration: Duration,

    /// Listings per board page.
    pub page_size: usize,

    /// Item kinds that cannot be listed (matched case-insensitively).
    pub blacklisted_items: Vec<String>,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            max_price: 1_000_000,
            max_listings_per_seller: 10,
            listing_duration: Duration::days(7),
            page_size: 45,
            blacklisted_items: Vec::new(),
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AuctionService<L: ListingStore> {
    store: L,
    config: AuctionConfig,
}

impl<L: ListingStore> AuctionService<L> {
    pub fn new(store: L) -> Self {
        Self {
            store,
            config: AuctionConfig::default(),
        }
    }

    pub fn new_with_config(store: L, config: AuctionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn is_blacklisted(&self, item_kind: &str) -> bool {
        self.config
            .blacklisted_items
            .iter()
            .any(|blocked| blocked.eq_ignore_ascii_case(item_kind))
    }

    /// List an item for the configured duration.
    pub async fn create_listing(
        &self,
        seller: Uuid,
        payload: ItemPayload,
        price: i64,
    ) -> Result<Listing, AuctionError> {
        self.create_listing_for(seller, payload, price, self.config.listing_duration)
            .await
    }

    pub async fn create_listing_for(
        &self,
        seller: Uuid,
        payload: ItemPayload,
        price: i64,
        duration: Duration,
    ) -> Result<Listing, AuctionError> {
        if price <= 0 {
            return Err(AuctionError::InvalidPrice(price));
        }
        if price > self.config.max_price {
            return Err(AuctionError::PriceTooHigh {
                price,
                max: self.config.max_price,
            });
        }
        if duration < Duration::milliseconds(1) {
            return Err(AuctionError::InvalidDuration);
        }
        if payload.is_empty() {
            return Err(AuctionError::EmptyItem);
        }

        let current = self.store.count_by_seller(seller).await?;
        if current >= self.config.max_listings_per_seller {
            return Err(AuctionError::TooManyListings {
                current,
                max: self.config.max_listings_per_seller,
            });
        }

        let created_at = now_millis();
        let expires_at = created_at
            .checked_add_signed(duration)
            .ok_or(AuctionError::InvalidDuration)?;
        let listing = self
            .store
            .create(NewListing {
                seller,
                payload,
                price,
                created_at,
                expires_at,
            })
            .await?;

        tracing::info!(
            "Listing {} created by {} for {} (expires {})",
            listing.id,
            seller,
            price,
            listing.expires_at
        );
        Ok(listing)
    }

    pub async fn get_listing(&self, id: ListingId) -> Result<Listing, AuctionError> {
        self.store.get(id).await?.ok_or(AuctionError::NotFound(id))
    }

    /// Buy a listing at its price. On success the host delivers the item.
    pub async fn buy(&self, buyer: Uuid, id: ListingId) -> Result<Listing, AuctionError> {
        let listing = match self.store.purchase(id, buyer, now_millis()).await {
            Ok(listing) => listing,
            Err(AuctionError::CorruptItem(id)) => return Err(self.discard(id).await),
            Err(e) => return Err(e),
        };
        tracing::info!(
            "Listing {} bought by {} from {} for {}",
            id,
            buyer,
            listing.seller,
            listing.price
        );
        Ok(listing)
    }

    /// Seller takes back an expired, unsold listing.
    pub async fn claim_expired(
        &self,
        player: Uuid,
        id: ListingId,
    ) -> Result<Listing, AuctionError> {
        let listing = self.get_listing(id).await?;
        if listing.seller != player {
            return Err(AuctionError::NotSeller);
        }
        if !listing.is_expired_at(now_millis()) {
            return Err(AuctionError::NotExpired(id));
        }
        self.remove(listing).await
    }

    /// Seller withdraws a listing before it expires.
    pub async fn cancel(&self, seller: Uuid, id: ListingId) -> Result<Listing, AuctionError> {
        let listing = self.get_listing(id).await?;
        if listing.seller != seller {
            return Err(AuctionError::NotSeller);
        }
        if listing.is_expired_at(now_millis()) {
            return Err(AuctionError::Expired(id));
        }
        self.remove(listing).await
    }

    async fn remove(&self, listing: Listing) -> Result<Listing, AuctionError> {
        if listing.payload.is_empty() {
            return Err(self.discard(listing.id).await);
        }
        // Lost a race with a buyer or a second claim.
        if !self.store.delete(listing.id).await? {
            return Err(AuctionError::NotFound(listing.id));
        }
        tracing::info!("Listing {} returned to {}", listing.id, listing.seller);
        Ok(listing)
    }

    /// Drop a listing whose item can't be read. Nobody is charged or credited.
    async fn discard(&self, id: ListingId) -> AuctionError {
        tracing::warn!("Removing listing {} with an unreadable item", id);
        match self.store.delete(id).await {
            Ok(_) => AuctionError::CorruptItem(id),
            Err(e) => e,
        }
    }

    pub async fn place_bid(
        &self,
        bidder: Uuid,
        id: ListingId,
        amount: i64,
    ) -> Result<Listing, AuctionError> {
        if amount <= 0 {
            return Err(AuctionError::InvalidPrice(amount));
        }

        let listing = self.get_listing(id).await?;
        let now = now_millis();
        check_biddable(&listing, bidder, amount, now)?;

        if !self.store.place_bid(id, bidder, amount, now).await? {
            // Someone outbid us or the listing closed in between.
            let latest = self.get_listing(id).await?;
            check_biddable(&latest, bidder, amount, now)?;
            return Err(AuctionError::BidTooLow {
                bid: amount,
                minimum: latest.minimum_bid(),
            });
        }

        tracing::debug!("Bid of {} on {} by {}", amount, id, bidder);
        self.get_listing(id).await
    }

    /// One page of the active board, 1-based.
    pub async fn page(&self, page: usize, page_size: usize) -> Result<Vec<Listing>, AuctionError> {
        let page_size = page_size.max(1);
        let offset = page.max(1).saturating_sub(1).saturating_mul(page_size);
        self.store.list_active(now_millis(), offset, page_size).await
    }

    pub async fn total_pages(&self, page_size: usize) -> Result<usize, AuctionError> {
        let total = self.store.count_active(now_millis()).await?;
        Ok(total.div_ceil(page_size.max(1)))
    }

    pub async fn listings_by_seller(&self, seller: Uuid) -> Result<Vec<Listing>, AuctionError> {
        self.store.list_by_seller(seller).await
    }

    pub async fn expired_listings(&self) -> Result<Vec<Listing>, AuctionError> {
        self.store.list_expired(now_millis()).await
    }

    pub async fn listing_count(&self) -> Result<usize, AuctionError> {
        self.store.count().await
    }
}

fn check_biddable(
    listing: &Listing,
    bidder: Uuid,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<(), AuctionError> {
    if listing.is_expired_at(now) {
        return Err(AuctionError::Expired(listing.id));
    }
    if listing.seller == bidder {
        return Err(AuctionError::OwnListing);
    }
    if amount < listing.minimum_bid() {
        return Err(AuctionError::BidTooLow {
            bid: amount,
            minimum: listing.minimum_bid(),
        });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;

    // Simple in-memory store for testing; one lock covers listings and balances.
    #[derive(Default)]
    struct InMemoryListingStore {
        state: Mutex<State>,
    }

    #[derive(Default)]
    struct State {
        next_id: i64,
        listings: BTreeMap<i64, Listing>,
        balances: HashMap<Uuid, i64>,
    }

    impl InMemoryListingStore {
        fn fund(&self, id: Uuid, amount: i64) {
            self.state.lock().unwrap().balances.insert(id, amount);
        }

        fn balance(&self, id: Uuid) -> i64 {
            *self.state.lock().unwrap().balances.get(&id).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl ListingStore for InMemoryListingStore {
        async fn create(&self, listing: NewListing) -> Result<Listing, AuctionError> {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let created = Listing {
                id: ListingId(state.next_id),
                seller: listing.seller,
                payload: listing.payload,
                price: listing.price,
                created_at: listing.created_at,
                expires_at: listing.expires_at,
                current_bidder: None,
                current_bid: None,
            };
            state.listings.insert(created.id.0, created.clone());
            Ok(created)
        }

        async fn get(&self, id: ListingId) -> Result<Option<Listing>, AuctionError> {
            Ok(self.state.lock().unwrap().listings.get(&id.0).cloned())
        }

        async fn list_active(
            &self,
            now: DateTime<Utc>,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<Listing>, AuctionError> {
            let state = self.state.lock().unwrap();
            let mut active: Vec<Listing> = state
                .listings
                .values()
                .filter(|l| !l.is_expired_at(now))
                .cloned()
                .collect();
            active.sort_by_key(|l| (l.expires_at, l.id));
            Ok(active.into_iter().skip(offset).take(limit).collect())
        }

        async fn count_active(&self, now: DateTime<Utc>) -> Result<usize, AuctionError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .values()
                .filter(|l| !l.is_expired_at(now))
                .count())
        }

        async fn list_by_seller(&self, seller: Uuid) -> Result<Vec<Listing>, AuctionError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .values()
                .filter(|l| l.seller == seller)
                .cloned()
                .collect())
        }

        async fn count_by_seller(&self, seller: Uuid) -> Result<usize, AuctionError> {
            Ok(self.list_by_seller(seller).await?.len())
        }

        async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Listing>, AuctionError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .listings
                .values()
                .filter(|l| l.is_expired_at(now))
                .cloned()
                .collect())
        }

        async fn delete(&self, id: ListingId) -> Result<bool, AuctionError> {
            Ok(self.state.lock().unwrap().listings.remove(&id.0).is_some())
        }

        async fn count(&self) -> Result<usize, AuctionError> {
            Ok(self.state.lock().unwrap().listings.len())
        }

        async fn place_bid(
            &self,
            id: ListingId,
            bidder: Uuid,
            amount: i64,
            now: DateTime<Utc>,
        ) -> Result<bool, AuctionError> {
            let mut state = self.state.lock().unwrap();
            match state.listings.get_mut(&id.0) {
                Some(l) if !l.is_expired_at(now) && amount >= l.minimum_bid() => {
                    l.current_bidder = Some(bidder);
                    l.current_bid = Some(amount);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn purchase(
            &self,
            id: ListingId,
            buyer: Uuid,
            now: DateTime<Utc>,
        ) -> Result<Listing, AuctionError> {
            let mut state = self.state.lock().unwrap();
            let listing = state
                .listings
                .get(&id.0)
                .cloned()
                .ok_or(AuctionError::NotFound(id))?;
            if listing.is_expired_at(now) {
                return Err(AuctionError::Expired(id));
            }
            if listing.seller == buyer {
                return Err(AuctionError::OwnListing);
            }
            if listing.payload.is_empty() {
                return Err(AuctionError::CorruptItem(id));
            }
            let available = *state.balances.get(&buyer).unwrap_or(&0);
            if available < listing.price {
                return Err(AuctionError::InsufficientFunds {
                    required: listing.price,
                    available,
                });
            }
            state.balances.insert(buyer, available - listing.price);
            *state.balances.entry(listing.seller).or_insert(0) += listing.price;
            state.listings.remove(&id.0);
            Ok(listing)
        }
    }

    fn item() -> ItemPayload {
        ItemPayload::new(b"DIAMOND_SWORD x1".to_vec())
    }

    // Stores a row the way a corrupt database row loads: with no item bytes.
    async fn corrupt_listing(
        service: &AuctionService<InMemoryListingStore>,
        seller: Uuid,
        duration: Duration,
    ) -> Listing {
        let created_at = now_millis();
        service
            .store
            .create(NewListing {
                seller,
                payload: ItemPayload::default(),
                price: 60,
                created_at,
                expires_at: created_at + duration,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_price_validation() {
        let service = AuctionService::new_with_config(
            InMemoryListingStore::default(),
            AuctionConfig {
                max_price: 100,
                ..AuctionConfig::default()
            },
        );
        let seller = Uuid::new_v4();

        assert_eq!(
            service.create_listing(seller, item(), 0).await,
            Err(AuctionError::InvalidPrice(0))
        );
        assert_eq!(
            service.create_listing(seller, item(), 101).await,
            Err(AuctionError::PriceTooHigh {
                price: 101,
                max: 100
            })
        );
        assert_eq!(
            service.create_listing(seller, ItemPayload::default(), 10).await,
            Err(AuctionError::EmptyItem)
        );
        assert!(service.create_listing(seller, item(), 100).await.is_ok());
    }

    #[tokio::test]
    async fn test_duration_bounds() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();

        for duration in [
            Duration::zero(),
            Duration::microseconds(500),
            Duration::days(100_000_000),
        ] {
            assert_eq!(
                service.create_listing_for(seller, item(), 10, duration).await,
                Err(AuctionError::InvalidDuration)
            );
        }
        assert_eq!(service.listing_count().await.unwrap(), 0);

        let listing = service
            .create_listing_for(seller, item(), 10, Duration::milliseconds(1))
            .await
            .unwrap();
        assert!(listing.expires_at > listing.created_at);
    }

    #[tokio::test]
    async fn test_listing_limit_per_seller() {
        let service = AuctionService::new_with_config(
            InMemoryListingStore::default(),
            AuctionConfig {
                max_listings_per_seller: 2,
                ..AuctionConfig::default()
            },
        );
        let seller = Uuid::new_v4();
        service.create_listing(seller, item(), 10).await.unwrap();
        service.create_listing(seller, item(), 10).await.unwrap();

        assert_eq!(
            service.create_listing(seller, item(), 10).await,
            Err(AuctionError::TooManyListings { current: 2, max: 2 })
        );
        // Other sellers are unaffected.
        assert!(service
            .create_listing(Uuid::new_v4(), item(), 10)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_buy_moves_money_and_removes_listing() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        service.store.fund(buyer, 80);

        let listing = service.create_listing(seller, item(), 50).await.unwrap();
        let bought = service.buy(buyer, listing.id).await.unwrap();

        assert_eq!(bought.payload, item());
        assert_eq!(service.store.balance(buyer), 30);
        assert_eq!(service.store.balance(seller), 50);
        assert_eq!(
            service.get_listing(listing.id).await,
            Err(AuctionError::NotFound(listing.id))
        );
    }

    #[tokio::test]
    async fn test_buy_expired_listing_rejected() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        service.store.fund(buyer, 100);

        let listing = service
            .create_listing_for(seller, item(), 50, Duration::milliseconds(1))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(
            service.buy(buyer, listing.id).await,
            Err(AuctionError::Expired(listing.id))
        );
        assert_eq!(service.store.balance(buyer), 100);
    }

    #[tokio::test]
    async fn test_corrupt_listing_is_removed_without_charging() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        service.store.fund(buyer, 100);

        let bad = corrupt_listing(&service, seller, Duration::hours(1)).await;
        assert_eq!(
            service.buy(buyer, bad.id).await,
            Err(AuctionError::CorruptItem(bad.id))
        );
        assert_eq!(service.store.balance(buyer), 100);
        assert_eq!(service.store.balance(seller), 0);
        assert_eq!(service.listing_count().await.unwrap(), 0);

        let stale = corrupt_listing(&service, seller, Duration::milliseconds(1)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(
            service.claim_expired(seller, stale.id).await,
            Err(AuctionError::CorruptItem(stale.id))
        );
        assert_eq!(service.listing_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_claim_expired_only_by_seller_after_expiry() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let open = service.create_listing(seller, item(), 50).await.unwrap();
        assert_eq!(
            service.claim_expired(seller, open.id).await,
            Err(AuctionError::NotExpired(open.id))
        );

        let short = service
            .create_listing_for(seller, item(), 50, Duration::milliseconds(1))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert_eq!(
            service.claim_expired(stranger, short.id).await,
            Err(AuctionError::NotSeller)
        );
        let claimed = service.claim_expired(seller, short.id).await.unwrap();
        assert_eq!(claimed.id, short.id);
        assert_eq!(
            service.claim_expired(seller, short.id).await,
            Err(AuctionError::NotFound(short.id))
        );
    }

    #[tokio::test]
    async fn test_cancel_active_listing() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let listing = service.create_listing(seller, item(), 50).await.unwrap();

        assert_eq!(
            service.cancel(Uuid::new_v4(), listing.id).await,
            Err(AuctionError::NotSeller)
        );
        assert!(service.cancel(seller, listing.id).await.is_ok());
        assert_eq!(service.listing_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_bids_must_increase() {
        let service = AuctionService::new(InMemoryListingStore::default());
        let seller = Uuid::new_v4();
        let bidder = Uuid::new_v4();
        let listing = service.create_listing(seller, item(), 50).await.unwrap();

        assert_eq!(
            service.place_bid(bidder, listing.id, 50).await,
            Err(AuctionError::BidTooLow {
                bid: 50,
                minimum: 51
            })
        );
        assert_eq!(
            service.place_bid(seller, listing.id, 60).await,
            Err(AuctionError::OwnListing)
        );

        let updated = service.place_bid(bidder, listing.id, 60).await.unwrap();
        assert_eq!(updated.current_bid, Some(60));
        assert_eq!(updated.current_bidder, Some(bidder));

        assert_eq!(
            service.place_bid(Uuid::new_v4(), listing.id, 60).await,
            Err(AuctionError::BidTooLow {
                bid: 60,
                minimum: 61
            })
        );
    }

    #[tokio::test]
    async fn test_pagination_page_count() {
        let service = AuctionService::new_with_config(
            InMemoryListingStore::default(),
            AuctionConfig {
                max_listings_per_seller: 100,
                ..AuctionConfig::default()
            },
        );
        let seller = Uuid::new_v4();
        for _ in 0..7 {
            service.create_listing(seller, item(), 10).await.unwrap();
        }

        assert_eq!(service.total_pages(3).await.unwrap(), 3);
        assert_eq!(service.page(1, 3).await.unwrap().len(), 3);
        assert_eq!(service.page(2, 3).await.unwrap().len(), 3);
        assert_eq!(service.page(3, 3).await.unwrap().len(), 1);
        assert!(service.page(4, 3).await.unwrap().is_empty());
        // Page 0 is treated as the first page.
        assert_eq!(service.page(0, 3).await.unwrap(), service.page(1, 3).await.unwrap());
    }

    #[test]
    fn test_blacklist_is_case_insensitive() {
        let service = AuctionService::new_with_config(
            InMemoryListingStore::default(),
            AuctionConfig {
                blacklisted_items: vec!["BEDROCK".to_string()],
                ..AuctionConfig::default()
            },
        );
        assert!(service.is_blacklisted("bedrock"));
        assert!(!service.is_blacklisted("diamond"));
    }
}
