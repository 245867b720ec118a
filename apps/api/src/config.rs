use anyhow::{anyhow, Context, Result};

use crate::jobs::filters::Ordering;
use crate::sources::{arbeitnow, jobicy, remoteok, remotive};

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Ordering used when a request does not ask for one.
    pub default_ordering: Ordering,
    pub sources: SourceEndpoints,
}

/// Upstream endpoints, overridable for staging mirrors and local testing.
#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    pub remotive_url: String,
    pub remoteok_url: String,
    pub arbeitnow_url: String,
    pub jobicy_url: String,
}

impl Default for SourceEndpoints {
    fn default() -> Self {
        Self {
            remotive_url: remotive::DEFAULT_URL.to_string(),
            remoteok_url: remoteok::DEFAULT_URL.to_string(),
            arbeitnow_url: arbeitnow::DEFAULT_URL.to_string(),
            jobicy_url: jobicy::DEFAULT_URL.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            http_timeout_secs: 20,
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            default_ordering: Ordering::Recency,
            sources: SourceEndpoints::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: env_or("PORT", defaults.port.to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", defaults.rust_log),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs.to_string())
                .parse::<u64>()
                .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            user_agent: env_or("HTTP_USER_AGENT", defaults.user_agent),
            default_ordering: env_or("JOBS_ORDERING", "recency".to_string())
                .parse::<Ordering>()
                .map_err(|e| anyhow!("JOBS_ORDERING: {e}"))?,
            sources: SourceEndpoints {
                remotive_url: env_or("REMOTIVE_URL", defaults.sources.remotive_url),
                remoteok_url: env_or("REMOTEOK_URL", defaults.sources.remoteok_url),
                arbeitnow_url: env_or("ARBEITNOW_URL", defaults.sources.arbeitnow_url),
                jobicy_url: env_or("JOBICY_URL", defaults.sources.jobicy_url),
            },
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}
