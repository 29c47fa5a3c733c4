// Auction module - domain logic for the auction house

mod auction_models;
mod auction_service;
mod item_payload;

pub use auction_models::{now_millis, Listing, ListingId, NewListing};
pub use auction_service::{AuctionConfig, AuctionError, AuctionService, ListingStore};
pub use item_payload::{ItemCodec, ItemPayload, PayloadError};
