//! Remotive — one request per category, issued concurrently and merged.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::job::normalize_posted;
use crate::models::{Job, JobDraft, SourceInfo};
use crate::sources::{
    decode_records, fetch_json, null_as_default, JobSource, NativeId, SourceError, SourceSpec,
};

pub const INFO: SourceInfo = SourceInfo {
    key: "remotive",
    name: "Remotive",
    home_url: "https://remotive.com/remote-jobs",
};

pub const DEFAULT_URL: &str = "https://remotive.com/api/remote-jobs";

/// Upstream categories fetched on every run.
pub const CATEGORIES: &[&str] = &["data", "software-dev"];

pub fn spec(endpoint: &str) -> SourceSpec {
    SourceSpec {
        endpoint: endpoint.to_string(),
        ttl: Duration::from_secs(600),
        skip: 0,
        limit: 100,
    }
}

#[derive(Debug, Deserialize)]
struct RemotiveResponse {
    jobs: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RemotiveJob {
    id: Option<NativeId>,
    url: Option<String>,
    title: Option<String>,
    company_name: Option<String>,
    category: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: Vec<String>,
    job_type: Option<String>,
    publication_date: Option<String>,
    candidate_required_location: Option<String>,
    salary: Option<String>,
}

impl RemotiveJob {
    fn into_job(self) -> Job {
        JobDraft {
            native_id: self.id.map(|id| id.to_string()),
            title: self.title,
            company: self.company_name,
            location: self.candidate_required_location,
            job_type: self.job_type,
            salary: self.salary,
            url: self.url,
            posted: self.publication_date.as_deref().map(normalize_posted),
            tags: self.tags,
            category: self.category,
        }
        .into_job(&INFO)
    }
}

pub struct Remotive {
    client: Client,
    spec: SourceSpec,
}

impl Remotive {
    pub fn new(client: Client, spec: SourceSpec) -> Self {
        Self { client, spec }
    }

    fn category_url(&self, category: &str) -> String {
        format!(
            "{}?category={category}&limit={}",
            self.spec.endpoint, self.spec.limit
        )
    }

    async fn fetch_category(&self, category: &str) -> Result<Vec<Job>, SourceError> {
        let url = self.category_url(category);
        let response: RemotiveResponse = fetch_json(&self.client, &url, self.spec.ttl).await?;
        Ok(map_jobs(response, &self.spec))
    }
}

fn map_jobs(response: RemotiveResponse, spec: &SourceSpec) -> Vec<Job> {
    let records = response.jobs.into_iter().skip(spec.skip).take(spec.limit);
    decode_records::<RemotiveJob>(INFO.key, records)
        .into_iter()
        .map(RemotiveJob::into_job)
        .collect()
}

#[async_trait]
impl JobSource for Remotive {
    fn info(&self) -> &SourceInfo {
        &INFO
    }

    /// A failed category is dropped; the run only fails if every category does.
    async fn try_fetch(&self) -> Result<Vec<Job>, SourceError> {
        let results = join_all(CATEGORIES.iter().map(|c| self.fetch_category(c))).await;

        let mut seen = HashSet::new();
        let mut jobs = Vec::new();
        let mut last_error = None;

        for (category, result) in CATEGORIES.iter().zip(results) {
            match result {
                Ok(batch) => jobs.extend(batch.into_iter().filter(|j| seen.insert(j.id.clone()))),
                Err(e) => {
                    warn!(source = INFO.key, category, "category fetch failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if jobs.is_empty() => Err(e),
            _ => Ok(jobs),
        }
    }
}
