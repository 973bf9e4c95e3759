//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Interval between installment status sweeps
    pub sweep_interval: Duration,

    /// Interval between upcoming-installment notification scans
    pub notify_interval: Duration,

    /// Look-ahead window (days) for upcoming-installment notifications
    pub upcoming_horizon_days: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Both background jobs run daily by default
        let sweep_interval_secs: u64 = env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SWEEP_INTERVAL_SECS"))?;

        let notify_interval_secs: u64 = env::var("NOTIFY_INTERVAL_SECS")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("NOTIFY_INTERVAL_SECS"))?;

        let upcoming_horizon_days = env::var("UPCOMING_HORIZON_DAYS")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("UPCOMING_HORIZON_DAYS"))?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
            notify_interval: Duration::from_secs(notify_interval_secs),
            upcoming_horizon_days,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
