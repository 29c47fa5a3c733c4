// Auction domain models - listings and their lifecycle checks.
//
// Pure data, no storage. Times are kept at millisecond precision because
// that is what the store persists.

use super::item_payload::ItemPayload;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Store-assigned listing number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An item up for sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: ListingId,
    pub seller: Uuid,
    pub payload: ItemPayload,
    /// Buy-now price, always > 0.
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub current_bidder: Option<Uuid>,
    pub current_bid: Option<i64>,
}

impl Listing {
    /// Expired strictly after the expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left before expiry, `None` once expired.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        if self.is_expired_at(now) {
            None
        } else {
            Some(self.expires_at - now)
        }
    }

    /// Smallest bid that would be accepted right now.
    pub fn minimum_bid(&self) -> i64 {
        self.current_bid.unwrap_or(self.price).saturating_add(1)
    }
}

/// A listing before the store assigns it an id.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub seller: Uuid,
    pub payload: ItemPayload,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Current time truncated to what the store can represent.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
