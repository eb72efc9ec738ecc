//! Runtime configuration from environment variables
//!
//! Each key is read with a `ZAIM_` prefix first, then without it:
//! - `CONSUMER_ID`, `CONSUMER_SECRET`: application credentials
//! - `ACCESS_TOKEN`, `ACCESS_TOKEN_SECRET`: pre-issued user token
//! - `ACCOUNT_NAME`, `CATEGORY`, `GENRE`: names resolved against Zaim
//! - `API_BASE`: API root (default: https://api.zaim.net/v2)

use crate::error::{Error, Result};
use crate::zaim::{Credentials, ZaimClient};

/// Human-readable names the importer resolves to Zaim IDs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub account: String,
    pub category: String,
    pub genre: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub targets: Targets,
    pub api_base: String,
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(&format!("ZAIM_{}", key))
                .or_else(|| lookup(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| -> Result<String> {
            get(key).ok_or_else(|| {
                Error::Config(format!("Missing environment variable ZAIM_{} (or {})", key, key))
            })
        };

        Ok(Self {
            credentials: Credentials {
                consumer_key: require("CONSUMER_ID")?,
                consumer_secret: require("CONSUMER_SECRET")?,
                access_token: require("ACCESS_TOKEN")?,
                access_token_secret: require("ACCESS_TOKEN_SECRET")?,
            },
            targets: Targets {
                account: require("ACCOUNT_NAME")?,
                category: require("CATEGORY")?,
                genre: require("GENRE")?,
            },
            api_base: get("API_BASE").unwrap_or_else(|| ZaimClient::DEFAULT_BASE_URL.to_string()),
        })
    }
}
