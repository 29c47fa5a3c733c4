mod sqlite_listing_store;

pub use sqlite_listing_store::SqliteListingStore;
