//! Process configuration, read once at startup from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | `dev-secret` |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `DATABASE_MAX_CONNECTIONS` | `5` |
//! | `STOCK_POLICY` | `allow_negative` |
//! | `LOW_STOCK_THRESHOLD` | `100` |
//! | `LOG_FORMAT` | `json` |
//!
//! Empty values count as unset.

use std::net::SocketAddr;

use thiserror::Error;

use stockroom_infra::LedgerSettings;
use stockroom_observability::LogFormat;
use stockroom_products::{LowStockRule, StockPolicy};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid {name}: {reason}")]
pub struct ConfigError {
    pub name: &'static str,
    pub reason: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl core::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // The URL usually embeds credentials.
        f.debug_struct("DatabaseConfig")
            .field("max_connections", &self.max_connections)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// True when `JWT_SECRET` was unset and the dev default is in use.
    pub jwt_secret_is_default: bool,
    pub database: Option<DatabaseConfig>,
    pub ledger: LedgerSettings,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret_is_default", &self.jwt_secret_is_default)
            .field("database", &self.database)
            .field("ledger", &self.ledger)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDR", e))?;

        let (jwt_secret, jwt_secret_is_default) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None => (DEV_JWT_SECRET.to_string(), true),
        };

        let database = match get("DATABASE_URL") {
            Some(url) => {
                let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => match raw.trim().parse::<u32>() {
                        Ok(0) => return Err(invalid("DATABASE_MAX_CONNECTIONS", "must be at least 1")),
                        Ok(n) => n,
                        Err(e) => return Err(invalid("DATABASE_MAX_CONNECTIONS", e)),
                    },
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                Some(DatabaseConfig { url, max_connections })
            }
            None => None,
        };

        let stock_policy = match get("STOCK_POLICY") {
            Some(raw) => raw.parse::<StockPolicy>().map_err(|e| invalid("STOCK_POLICY", e))?,
            None => StockPolicy::default(),
        };
        let low_stock = match get("LOW_STOCK_THRESHOLD") {
            Some(raw) => raw
                .parse::<LowStockRule>()
                .map_err(|e| invalid("LOW_STOCK_THRESHOLD", e))?,
            None => LowStockRule::default(),
        };

        let log_format = match get("LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or_else(|| invalid("LOG_FORMAT", "expected json or compact"))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_is_default,
            database,
            ledger: LedgerSettings { stock_policy, low_stock },
            log_format,
        })
    }
}

fn invalid(name: &'static str, reason: impl core::fmt::Display) -> ConfigError {
    ConfigError {
        name,
        reason: reason.to_string(),
    }
}
