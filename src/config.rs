use std::{env, time::Duration};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_LOG_FILTER: &str = "sitae_authoring=info,sitae_author=info";
const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub cache_ttl: Duration,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_base_url: non_empty("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            api_token: non_empty("API_TOKEN"),
            cache_ttl: Duration::from_secs(
                non_empty("CACHE_TTL_SECS")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_CACHE_TTL_SECS),
            ),
            log_filter: non_empty("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        }
    }
}
