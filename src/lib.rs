// UB Economy - a balance ledger and auction house on SQLite.
//
// **Architecture Overview:**
// - `core/` = Business logic (ledger and auction rules, store traits)
// - `infra/` = Implementations of core traits (SQLite pool, stores, worker pool)
// - `host/` = The game-server side (host loop, continuations, console commands)

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "host/host_layer.rs"]
pub mod host;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub mod settings;
