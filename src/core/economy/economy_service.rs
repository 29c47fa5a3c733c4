// Economy system core - the balance ledger.
//
// This module contains all the domain logic for player balances. It is
// platform-agnostic: no SQL and no host types live here. Storage sits behind
// the BalanceStore trait, implemented in infra.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A player's account. The balance is never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub balance: i64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(i64),

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Insufficient funds: need {required}, but only have {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Amount {amount} exceeds the limit of {limit}")]
    LimitExceeded { amount: i64, limit: i64 },

    #[error("Cannot transfer to the same account")]
    SelfTransfer,

    #[error("Balance cannot hold {amount} more (currently {balance})")]
    BalanceOverflow { balance: i64, amount: i64 },

    #[error("Store error: {0}")]
    Storage(String),
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Trait for persisting balances.
///
/// Every mutation must be a single conditional write at the storage layer so
/// concurrent callers cannot push a balance below zero.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance, creating the account at 0 if it doesn't exist.
    async fn get_balance(&self, id: Uuid) -> Result<i64, LedgerError>;

    /// Overwrite the balance, clamped to 0. Returns the stored value.
    async fn set_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError>;

    /// Credit `amount` (>= 0). Returns the new balance.
    async fn add_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError>;

    /// Debit `amount` (>= 0) if the balance covers it. Returns the new balance.
    async fn remove_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError>;

    async fn has_balance(&self, id: Uuid, amount: i64) -> Result<bool, LedgerError> {
        Ok(self.get_balance(id).await? >= amount)
    }

    /// Move `amount` from one account to another, all or nothing.
    async fn transfer(&self, from: Uuid, to: Uuid, amount: i64) -> Result<(), LedgerError>;

    /// Richest accounts first.
    async fn top_balances(&self, limit: usize) -> Result<Vec<Account>, LedgerError>;

    /// Admin removal. Returns whether a row existed.
    async fn delete_account(&self, id: Uuid) -> Result<bool, LedgerError>;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the economy system.
#[derive(Debug, Clone)]
pub struct EconomyConfig {
    /// Largest single deposit.
    pub max_deposit: i64,

    /// Largest single withdrawal.
    pub max_withdraw: i64,

    /// Largest single payment between players.
    pub max_pay: i64,

    /// Entries shown by the leaderboard.
    pub leaderboard_size: usize,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            max_deposit: 1_000_000,
            max_withdraw: 1_000_000,
            max_pay: 1_000_000,
            leaderboard_size: 10,
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// The main service for balance operations.
///
/// Generic over S: BalanceStore so we can swap implementations.
pub struct EconomyService<S: BalanceStore> {
    store: S,
    config: EconomyConfig,
}

impl<S: BalanceStore> EconomyService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: EconomyConfig::default(),
        }
    }

    pub fn new_with_config(store: S, config: EconomyConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub async fn get_balance(&self, id: Uuid) -> Result<i64, LedgerError> {
        self.store.get_balance(id).await
    }

    /// Admin override. Negative values are stored as 0.
    pub async fn set_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        let stored = self.store.set_balance(id, amount).await?;
        tracing::info!("Balance of {} set to {}", id, stored);
        Ok(stored)
    }

    pub async fn add_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount(amount));
        }
        self.store.add_balance(id, amount).await
    }

    pub async fn remove_balance(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        if amount < 0 {
            return Err(LedgerError::NegativeAmount(amount));
        }
        self.store.remove_balance(id, amount).await
    }

    pub async fn has_balance(&self, id: Uuid, amount: i64) -> Result<bool, LedgerError> {
        self.store.has_balance(id, amount).await
    }

    /// Credit currency the host has already taken from the player.
    ///
    /// If this fails the host must give the items back.
    pub async fn deposit(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        check_amount(amount, self.config.max_deposit)?;
        let new_balance = self.store.add_balance(id, amount).await?;
        tracing::debug!("Deposit of {} for {} -> {}", amount, id, new_balance);
        Ok(new_balance)
    }

    /// Debit currency the host is about to hand to the player.
    pub async fn withdraw(&self, id: Uuid, amount: i64) -> Result<i64, LedgerError> {
        check_amount(amount, self.config.max_withdraw)?;
        let new_balance = self.store.remove_balance(id, amount).await?;
        tracing::debug!("Withdrawal of {} for {} -> {}", amount, id, new_balance);
        Ok(new_balance)
    }

    /// Pay another player. Returns the payer's new balance.
    pub async fn pay(&self, from: Uuid, to: Uuid, amount: i64) -> Result<i64, LedgerError> {
        check_amount(amount, self.config.max_pay)?;
        if from == to {
            return Err(LedgerError::SelfTransfer);
        }

        self.store.transfer(from, to, amount).await?;
        tracing::info!("{} paid {} to {}", from, amount, to);
        self.store.get_balance(from).await
    }

    /// Leaderboard of the configured size.
    pub async fn top_balances(&self) -> Result<Vec<Account>, LedgerError> {
        self.store.top_balances(self.config.leaderboard_size).await
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<bool, LedgerError> {
        let removed = self.store.delete_account(id).await?;
        if removed {
            tracing::info!("Account {} deleted", id);
        }
        Ok(removed)
    }
}

fn check_amount(amount: i64, limit: i64) -> Result<(), LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount);
    }
    if amount > limit {
        return Err(LedgerError::LimitExceeded { amount, limit });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
