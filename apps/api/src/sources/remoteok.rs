//! RemoteOK — a bare JSON array whose first element is a legal notice, not a job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::job::{normalize_posted, posted_from_unix, salary_range};
use crate::models::{Job, JobDraft, SourceInfo};
use crate::sources::{
    decode_records, fetch_json, null_as_default, Amount, JobSource, NativeId, SourceError,
    SourceSpec,
};

pub const INFO: SourceInfo = SourceInfo {
    key: "remoteok",
    name: "RemoteOK",
    home_url: "https://remoteok.com",
};

pub const DEFAULT_URL: &str = "https://remoteok.com/api";

pub fn spec(endpoint: &str) -> SourceSpec {
    SourceSpec {
        endpoint: endpoint.to_string(),
        ttl: Duration::from_secs(300),
        skip: 1,
        limit: 100,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemoteOkJob {
    id: Option<NativeId>,
    slug: Option<String>,
    epoch: Option<i64>,
    date: Option<String>,
    company: Option<String>,
    position: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: Vec<String>,
    location: Option<String>,
    salary_min: Option<Amount>,
    salary_max: Option<Amount>,
    url: Option<String>,
    apply_url: Option<String>,
}

impl RemoteOkJob {
    fn into_job(self) -> Job {
        let native_id = self.id.map(|id| id.to_string());
        let url = self
            .url
            .or(self.apply_url)
            .or_else(|| {
                self.slug
                    .as_deref()
                    .or(native_id.as_deref())
                    .map(|s| format!("{}/remote-jobs/{s}", INFO.home_url))
            });
        let posted = self
            .date
            .as_deref()
            .map(normalize_posted)
            .or_else(|| self.epoch.and_then(posted_from_unix));

        JobDraft {
            native_id,
            title: self.position,
            company: self.company,
            location: self.location,
            job_type: None,
            salary: salary_range(
                self.salary_min.as_ref().and_then(Amount::as_u64),
                self.salary_max.as_ref().and_then(Amount::as_u64),
            ),
            url,
            posted,
            tags: self.tags,
            category: None,
        }
        .into_job(&INFO)
    }
}

fn map_jobs(records: Vec<Value>, spec: &SourceSpec) -> Vec<Job> {
    let records = records.into_iter().skip(spec.skip).take(spec.limit);
    decode_records::<RemoteOkJob>(INFO.key, records)
        .into_iter()
        .map(RemoteOkJob::into_job)
        .collect()
}

pub struct RemoteOk {
    client: Client,
    spec: SourceSpec,
}

impl RemoteOk {
    pub fn new(client: Client, spec: SourceSpec) -> Self {
        Self { client, spec }
    }
}

#[async_trait]
impl JobSource for RemoteOk {
    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn try_fetch(&self) -> Result<Vec<Job>, SourceError> {
        let records: Vec<Value> =
            fetch_json(&self.client, &self.spec.endpoint, self.spec.ttl).await?;
        Ok(map_jobs(records, &self.spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"[
        {"last_updated": 1714640000, "legal": "API Terms of Service: link back to Remote OK"},
        {
            "slug": "remote-junior-sql-analyst-acme-1093221",
            "id": "1093221",
            "epoch": 1714640000,
            "date": "2024-05-02T09:00:00+00:00",
            "company": "Acme",
            "position": "Junior SQL Analyst",
            "tags": ["sql", "analyst"],
            "location": "Austin, TX",
            "salary_min": 60000,
            "salary_max": 80000,
            "url": "https://remoteok.com/remote-jobs/remote-junior-sql-analyst-acme-1093221"
        },
        {
            "id": 1093222,
            "epoch": 0,
            "position": "Data Engineer",
            "salary_min": 0,
            "salary_max": 0
        }
    ]"#;

    #[test]
    fn test_skips_legal_header_record() {
        let records: Vec<Value> = serde_json::from_str(PAYLOAD).unwrap();
        let jobs = map_jobs(records, &spec(DEFAULT_URL));
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Junior SQL Analyst");
    }

    #[test]
    fn test_maps_salary_band_and_date() {
        let records: Vec<Value> = serde_json::from_str(PAYLOAD).unwrap();
        let jobs = map_jobs(records, &spec(DEFAULT_URL));
        let job = &jobs[0];
        assert_eq!(job.id, "remoteok-1093221");
        assert_eq!(job.salary.as_deref(), Some("$60000-80000"));
        assert_eq!(job.posted.as_deref(), Some("2024-05-02T09:00:00Z"));
        assert_eq!(job.location, "Austin, TX");
        assert_eq!(job.source, "RemoteOK");
    }

    #[test]
    fn test_synthesizes_url_and_falls_back_to_epoch() {
        let records: Vec<Value> = serde_json::from_str(PAYLOAD).unwrap();
        let jobs = map_jobs(records, &spec(DEFAULT_URL));
        let job = &jobs[1];
        assert_eq!(job.url, "https://remoteok.com/remote-jobs/1093222");
        assert_eq!(job.posted.as_deref(), Some("1970-01-01T00:00:00Z"));
        assert_eq!(job.salary, None);
        assert_eq!(job.company, "Unknown");
        assert_eq!(job.location, "Remote");
    }

    #[test]
    fn test_null_tags_and_salary_text_are_tolerated() {
        let records: Vec<Value> = serde_json::from_str(
            r#"[
                {"legal": "notice"},
                {"id": 5, "position": "Data Analyst", "tags": null, "salary_min": "n/a"},
                {"id": 6, "position": {"nested": true}}
            ]"#,
        )
        .unwrap();
        let jobs = map_jobs(records, &spec(DEFAULT_URL));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "remoteok-5");
        assert!(jobs[0].tags.is_empty());
        assert_eq!(jobs[0].salary, None);
    }

    #[test]
    fn test_object_payload_is_a_shape_error() {
        assert!(serde_json::from_str::<Vec<Value>>(r#"{"error": "rate limited"}"#).is_err());
    }
}
