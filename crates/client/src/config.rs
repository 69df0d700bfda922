//! Client configuration.

use std::{env, path::PathBuf};

use thiserror::Error;

const API_BASE_URL_VAR: &str = "ATELIER_API_BASE_URL";
const SNAPSHOT_PATH_VAR: &str = "ATELIER_CART_SNAPSHOT";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8698";
const DEFAULT_SNAPSHOT_PATH: &str = "atelier-cart.json";

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid value for {variable}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        variable: &'static str,
        /// What made the value unusable.
        reason: &'static str,
    },
}

/// Cart client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Cart backend base address.
    pub api_base_url: String,

    /// Where the durable cart snapshot lives.
    pub snapshot_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a set variable holds an unusable value.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        let api_base_url = match env::var(API_BASE_URL_VAR) {
            Ok(value) => normalize_base_url(&value)?,
            Err(_) => DEFAULT_API_BASE_URL.to_string(),
        };

        let snapshot_path = env::var_os(SNAPSHOT_PATH_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH), PathBuf::from);

        Ok(Self {
            api_base_url,
            snapshot_path,
        })
    }
}

fn normalize_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return Err(ConfigError::InvalidValue {
            variable: API_BASE_URL_VAR,
            reason: "must not be empty",
        });
    }

    Ok(trimmed.to_string())
}
