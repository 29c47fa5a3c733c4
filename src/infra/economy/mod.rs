// Economy infrastructure - SQLite storage implementation

pub(crate) mod ledger_queries;
mod sqlite_balance_store;

pub use sqlite_balance_store::SqliteBalanceStore;
