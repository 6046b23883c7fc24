//! Application configuration loaded from environment variables.
//!
//! Everything has a sensible local default so `cargo run` works out of the
//! box with no `.env` file.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Path of the JSON snapshot file backing the store.
    /// Empty string means a volatile in-memory store.
    pub data_file: String,
    /// Optional boss roster JSON file; the built-in roster is used when unset.
    pub boss_roster_file: Option<String>,
    /// Display name given to the user created on first start
    pub hero_name: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            data_file: String::new(),
            boss_roster_file: None,
            hero_name: "Hero".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT"))?,
            data_file: env::var("DATA_FILE").unwrap_or_else(|_| "data/herofit.json".to_string()),
            boss_roster_file: env::var("BOSS_ROSTER_FILE").ok().filter(|v| !v.is_empty()),
            hero_name: env::var("HERO_NAME").unwrap_or_else(|_| "Hero".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
