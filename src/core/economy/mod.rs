// Economy module - domain logic for player balances

mod economy_service;

pub use economy_service::{Account, BalanceStore, EconomyConfig, EconomyService, LedgerError};
