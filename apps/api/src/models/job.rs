use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder used when an upstream omits a title or company.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder used when an upstream omits a location.
pub const DEFAULT_LOCATION: &str = "Remote";

/// Canonical job record every source adapter maps into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    pub url: String,
    /// Display name of the adapter that produced this record.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Static identity of one upstream board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    /// Internal key, used in ids and in `SourceCounts`.
    pub key: &'static str,
    /// Display name, written to `Job::source`.
    pub name: &'static str,
    /// Landing page used when a posting has no link of its own.
    pub home_url: &'static str,
}

/// Raw, loosely-typed fields an adapter extracted from one upstream record.
/// `into_job` applies the default-fallback rules.
#[derive(Debug, Default)]
pub struct JobDraft {
    pub native_id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub salary: Option<String>,
    pub url: Option<String>,
    pub posted: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
}

impl JobDraft {
    /// Builds the canonical record, applying the placeholder defaults.
    pub fn into_job(self, source: &SourceInfo) -> Job {
        let title = non_blank(self.title).unwrap_or_else(|| UNKNOWN.to_string());
        let company = non_blank(self.company).unwrap_or_else(|| UNKNOWN.to_string());
        let url = non_blank(self.url).unwrap_or_else(|| source.home_url.to_string());

        let id = match non_blank(self.native_id) {
            Some(native) => format!("{}-{native}", source.key),
            None => fallback_id(source.key, &title, &company, &url),
        };

        Job {
            id,
            title,
            company,
            location: non_blank(self.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            job_type: non_blank(self.job_type),
            salary: non_blank(self.salary),
            url,
            source: source.name.to_string(),
            posted: non_blank(self.posted),
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            category: non_blank(self.category),
        }
    }
}

/// Stable id for records that arrive without a native identifier.
pub fn fallback_id(source_key: &str, title: &str, company: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"|");
    hasher.update(company.as_bytes());
    hasher.update(b"|");
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{source_key}-{}", &digest[..12])
}

/// Formats a numeric salary band as `$<min>-<max>`. Both bounds must be positive.
pub fn salary_range(min: Option<u64>, max: Option<u64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min > 0 && max > 0 => Some(format!("${min}-{max}")),
        _ => None,
    }
}

/// Normalizes an upstream timestamp to RFC 3339 UTC so postings from
/// different boards sort against each other. Unparseable values pass through.
pub fn normalize_posted(raw: &str) -> String {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return to_rfc3339(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return to_rfc3339(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return to_rfc3339(Utc.from_utc_datetime(&naive));
    }

    raw.to_string()
}

/// Converts unix seconds to the same RFC 3339 form as `normalize_posted`.
pub fn posted_from_unix(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(to_rfc3339)
}

fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Per-source contribution tally for one aggregation run, keyed by source key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceCounts(BTreeMap<String, usize>);

impl SourceCounts {
    /// Every key present with a zero count.
    pub fn zeroed<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self(keys.into_iter().map(|k| (k.to_string(), 0)).collect())
    }

    pub fn record(&mut self, key: &str, count: usize) {
        self.0.insert(key.to_string(), count);
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}
