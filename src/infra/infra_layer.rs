// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "database/mod.rs"]
pub mod database;

#[path = "economy/mod.rs"]
pub mod economy;

#[path = "auction/mod.rs"]
pub mod auction;
