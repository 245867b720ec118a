//! Source adapters — one per upstream job board.
//!
//! Every adapter fetches once per aggregation run, maps its own payload schema
//! onto `Job`, and never lets a failure escape: `JobSource::fetch` logs and
//! returns an empty list instead.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Job, SourceInfo};

pub mod arbeitnow;
pub mod jobicy;
pub mod remoteok;
pub mod remotive;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("unexpected payload shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Static per-adapter fetch settings.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    pub endpoint: String,
    /// Freshness hint sent upstream as `Cache-Control: max-age`.
    pub ttl: Duration,
    /// Leading records to drop before mapping (non-job header rows).
    pub skip: usize,
    /// Maximum number of records consumed after `skip`.
    pub limit: usize,
}

/// One upstream job board.
#[async_trait]
pub trait JobSource: Send + Sync {
    fn info(&self) -> &SourceInfo;

    /// Fetches and maps the upstream payload. Errors are reported, not absorbed.
    async fn try_fetch(&self) -> Result<Vec<Job>, SourceError>;

    /// Best-effort fetch: any failure is logged and yields no jobs.
    async fn fetch(&self) -> Vec<Job> {
        let started = Instant::now();
        match self.try_fetch().await {
            Ok(jobs) => {
                debug!(
                    source = self.info().key,
                    count = jobs.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "source fetched"
                );
                jobs
            }
            Err(e) => {
                warn!(source = self.info().key, "source fetch failed: {e}");
                Vec::new()
            }
        }
    }
}

/// GETs `url` and decodes the body against the adapter's expected schema.
pub async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    ttl: Duration,
) -> Result<T, SourceError> {
    debug!("GET {url}");

    let response = client
        .get(url)
        .header(header::ACCEPT, "application/json")
        .header(header::CACHE_CONTROL, format!("max-age={}", ttl.as_secs()))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Decodes each raw record on its own. A record that does not fit the schema
/// is logged and dropped; the rest of the batch survives.
pub fn decode_records<T: DeserializeOwned>(
    source: &str,
    records: impl IntoIterator<Item = Value>,
) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(source, "skipping malformed record: {e}");
                None
            }
        })
        .collect()
}

/// `deserialize_with` helper: an explicit `null` decodes like a missing field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Native identifiers arrive as numbers on some boards and strings on others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NativeId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeId::Number(n) => write!(f, "{n}"),
            NativeId::Text(s) => f.write_str(s),
        }
    }
}

/// Salary bounds that some boards send as numbers and others as numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn as_u64(&self) -> Option<u64> {
        let value = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        };
        (value.is_finite() && value > 0.0).then(|| value.round() as u64)
    }
}

/// Builds the full adapter set from configuration.
pub fn default_sources(client: Client, config: &Config) -> Vec<Arc<dyn JobSource>> {
    vec![
        Arc::new(remotive::Remotive::new(
            client.clone(),
            remotive::spec(&config.sources.remotive_url),
        )),
        Arc::new(remoteok::RemoteOk::new(
            client.clone(),
            remoteok::spec(&config.sources.remoteok_url),
        )),
        Arc::new(arbeitnow::Arbeitnow::new(
            client.clone(),
            arbeitnow::spec(&config.sources.arbeitnow_url),
        )),
        Arc::new(jobicy::Jobicy::new(client, jobicy::spec(&config.sources.jobicy_url))),
    ]
}

/// Spins up a throwaway local HTTP server for adapter tests.
#[cfg(test)]
pub(crate) mod testing {
    use axum::Router;

    /// Serves `router` on an ephemeral port and returns its base URL.
    pub async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
