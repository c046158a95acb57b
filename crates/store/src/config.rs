//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_PATH` - File used by the file backend (default: cart.json)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: products)
//! - `CART_ON_CORRUPT` - What to do with an unreadable stored cart:
//!   `reset` (default) or `fail`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::store::DEFAULT_STORAGE_KEY;

const DEFAULT_STORAGE_PATH: &str = "cart.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How [`CartStore::load`](crate::CartStore::load) treats a stored cart that
/// cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStatePolicy {
    /// Log a warning and start from an empty cart.
    #[default]
    Reset,
    /// Return [`CartError::CorruptState`](crate::CartError::CorruptState).
    Fail,
}

impl FromStr for CorruptStatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "fail" => Ok(Self::Fail),
            other => Err(format!("expected `reset` or `fail`, got `{other}`")),
        }
    }
}

impl fmt::Display for CorruptStatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Backing file for [`FilePersistence`](crate::FilePersistence)
    pub storage_path: PathBuf,
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Recovery policy for an unreadable stored cart
    pub on_corrupt: CorruptStatePolicy,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            on_corrupt: CorruptStatePolicy::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage_path = PathBuf::from(get_env_or_default(
            "CART_STORAGE_PATH",
            DEFAULT_STORAGE_PATH,
        ));
        let storage_key = get_env_or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let on_corrupt = get_env_or_default("CART_ON_CORRUPT", "reset")
            .parse::<CorruptStatePolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("CART_ON_CORRUPT".to_string(), e))?;

        Ok(Self {
            storage_path,
            storage_key,
            on_corrupt,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
