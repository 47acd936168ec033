//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CANDOR_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use candor::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod database;
mod email;
mod error;
mod oracle;
mod scoring;
mod server;

pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use oracle::OracleConfig;
pub use scoring::ScoringConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::domain::analysis::AnalysisThresholds;
use crate::domain::membership::DailyBudgets;

/// Root application configuration
///
/// Contains all configuration sections for the Candor service.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Scoring oracle configuration (endpoint, workers, retries)
    pub oracle: OracleConfig,

    /// Email configuration (Resend, weekly report schedule)
    pub email: EmailConfig,

    /// Grading configuration (violation penalty, iteration counting)
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Analysis thresholds (sample sizes, gaps, trend windows)
    #[serde(default)]
    pub analysis: AnalysisThresholds,

    /// Per-tier daily exchange budgets
    #[serde(default)]
    pub plans: DailyBudgets,

    /// Path to a drill catalog YAML file; the built-in catalog is used when unset
    #[serde(default)]
    pub catalog_path: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CANDOR` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CANDOR__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CANDOR__DATABASE__URL=...` -> `database.url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CANDOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Performs semantic validation of configuration:
    /// - URL formats
    /// - Pool size and worker count constraints
    /// - Required API key prefixes
    /// - Threshold and budget coherence
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.oracle.validate()?;
        self.email.validate()?;
        self.scoring.validate()?;
        self.analysis.validate()?;
        self.plans.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
