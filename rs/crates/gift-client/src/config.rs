//! config.rs — Client configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

use gift_query::{QueryOptions, DEFAULT_RETRY_BACKOFF};
use tracing::info;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_PREFS_PATH: &str = "gift-prefs.json";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub prefs_path: PathBuf,
    pub stale_time: Duration,
    pub query_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let query = QueryOptions::default();
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            prefs_path: PathBuf::from(DEFAULT_PREFS_PATH),
            stale_time: query.stale_time,
            query_retries: query.retries,
        }
    }
}

impl ClientConfig {
    /// Read `GIFT_API_BASE_URL`, `GIFT_PREFS_PATH`, `GIFT_STALE_SECS` and
    /// `GIFT_QUERY_RETRIES`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(url) = lookup("GIFT_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(path) = lookup("GIFT_PREFS_PATH") {
            config.prefs_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("GIFT_STALE_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid GIFT_STALE_SECS: {}", secs)))?;
            config.stale_time = Duration::from_secs(secs);
        }
        if let Some(n) = lookup("GIFT_QUERY_RETRIES") {
            config.query_retries = n
                .trim()
                .parse()
                .map_err(|_| ClientError::Config(format!("invalid GIFT_QUERY_RETRIES: {}", n)))?;
        }
        info!(
            api = %config.api_base_url,
            prefs = %config.prefs_path.display(),
            stale_secs = config.stale_time.as_secs(),
            retries = config.query_retries,
            "client config"
        );
        Ok(config)
    }

    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            stale_time: self.stale_time,
            retries: self.query_retries,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}
