// Connection/task layer - pooled SQLite access plus the worker pool.

mod database;
mod task_pool;

pub use database::{Database, DatabaseOptions, DbError, TxFuture};
pub use task_pool::{TaskHandle, TaskPool};

#[cfg(test)]
pub(crate) use database::test_support;
