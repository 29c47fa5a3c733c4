// Runtime settings, read from UBE_* environment variables (a .env file works too).
//
// Unset variables fall back to defaults. Unparsable values are logged and
// ignored; values that can't work at all (a zero-sized pool) stop startup.

use crate::core::auction::AuctionConfig;
use crate::core::economy::EconomyConfig;
use crate::host::console::HostOptions;
use crate::infra::database::DatabaseOptions;
use anyhow::{bail, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseOptions,
    /// Store operations allowed in flight at once.
    pub workers: usize,
    pub economy: EconomyConfig,
    pub auction: AuctionConfig,
    pub host: HostOptions,
    pub sweep_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let db_defaults = DatabaseOptions::default();
        let database = DatabaseOptions {
            path: env
                .get("UBE_DB_PATH")
                .map(Into::into)
                .unwrap_or(db_defaults.path),
            pool_size: env.parse_or("UBE_DB_POOL_SIZE", db_defaults.pool_size),
            acquire_timeout: Duration::from_secs(env.parse_or(
                "UBE_DB_ACQUIRE_TIMEOUT_SECS",
                db_defaults.acquire_timeout.as_secs(),
            )),
        };
        if database.pool_size == 0 {
            bail!("UBE_DB_POOL_SIZE must be at least 1");
        }

        let workers = env.parse_or("UBE_WORKERS", database.pool_size as usize);
        if workers == 0 {
            bail!("UBE_WORKERS must be at least 1");
        }

        let eco_defaults = EconomyConfig::default();
        let economy = EconomyConfig {
            max_deposit: env.parse_or("UBE_MAX_DEPOSIT", eco_defaults.max_deposit),
            max_withdraw: env.parse_or("UBE_MAX_WITHDRAW", eco_defaults.max_withdraw),
            max_pay: env.parse_or("UBE_MAX_PAY", eco_defaults.max_pay),
            leaderboard_size: env.parse_or("UBE_LEADERBOARD_SIZE", eco_defaults.leaderboard_size),
        };

        let ah_defaults = AuctionConfig::default();
        let duration_hours: i64 = env.parse_or(
            "UBE_LISTING_DURATION_HOURS",
            ah_defaults.listing_duration.num_hours(),
        );
        if duration_hours <= 0 {
            bail!("UBE_LISTING_DURATION_HOURS must be positive");
        }
        let Some(listing_duration) = chrono::Duration::try_hours(duration_hours) else {
            bail!("UBE_LISTING_DURATION_HOURS is too large: {}", duration_hours);
        };
        let auction = AuctionConfig {
            max_price: env.parse_or("UBE_MAX_PRICE", ah_defaults.max_price),
            max_listings_per_seller: env
                .parse_or("UBE_MAX_LISTINGS", ah_defaults.max_listings_per_seller),
            listing_duration,
            page_size: env.parse_or("UBE_PAGE_SIZE", ah_defaults.page_size).max(1),
            blacklisted_items: env
                .get("UBE_BLACKLIST")
                .map(|raw| {
                    raw.split(',')
                        .map(|item| item.trim().to_uppercase())
                        .filter(|item| !item.is_empty())
                        .collect()
                })
                .unwrap_or(ah_defaults.blacklisted_items),
        };

        let host_defaults = HostOptions::default();
        let host = HostOptions {
            currency_singular: env
                .get("UBE_CURRENCY_SINGULAR")
                .unwrap_or(host_defaults.currency_singular),
            currency_plural: env
                .get("UBE_CURRENCY_PLURAL")
                .unwrap_or(host_defaults.currency_plural),
            inventory_slots: env.parse_or("UBE_INVENTORY_SLOTS", host_defaults.inventory_slots),
        };

        let sweep_interval =
            Duration::from_secs(env.parse_or("UBE_SWEEP_INTERVAL_SECS", 60u64).max(1));

        Ok(Self {
            database,
            workers,
            economy,
            auction,
            host,
            sweep_interval,
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse_or<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}='{}' ({}), using {:?}", key, raw, e, default);
                default
            }),
            None => default,
        }
    }
}
