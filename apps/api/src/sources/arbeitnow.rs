//! Arbeitnow — `{data: [...]}` keyed by slug, timestamps in unix seconds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::job::posted_from_unix;
use crate::models::{Job, JobDraft, SourceInfo};
use crate::sources::{
    decode_records, fetch_json, null_as_default, JobSource, SourceError, SourceSpec,
};

pub const INFO: SourceInfo = SourceInfo {
    key: "arbeitnow",
    name: "Arbeitnow",
    home_url: "https://www.arbeitnow.com",
};

pub const DEFAULT_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

pub fn spec(endpoint: &str) -> SourceSpec {
    SourceSpec {
        endpoint: endpoint.to_string(),
        ttl: Duration::from_secs(600),
        skip: 0,
        limit: 100,
    }
}

#[derive(Debug, Deserialize)]
struct ArbeitnowResponse {
    data: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArbeitnowJob {
    slug: Option<String>,
    company_name: Option<String>,
    title: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    remote: bool,
    url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    job_types: Vec<String>,
    location: Option<String>,
    created_at: Option<i64>,
}

impl ArbeitnowJob {
    fn into_job(self) -> Job {
        let job_type = self
            .job_types
            .first()
            .cloned()
            .or_else(|| self.remote.then(|| "Remote".to_string()));
        let url = self.url.or_else(|| {
            self.slug
                .as_deref()
                .map(|s| format!("{}/jobs/{s}", INFO.home_url))
        });

        JobDraft {
            native_id: self.slug,
            title: self.title,
            company: self.company_name,
            location: self.location,
            job_type,
            salary: None,
            url,
            posted: self.created_at.and_then(posted_from_unix),
            tags: self.tags,
            category: None,
        }
        .into_job(&INFO)
    }
}

fn map_jobs(response: ArbeitnowResponse, spec: &SourceSpec) -> Vec<Job> {
    let records = response.data.into_iter().skip(spec.skip).take(spec.limit);
    decode_records::<ArbeitnowJob>(INFO.key, records)
        .into_iter()
        .map(ArbeitnowJob::into_job)
        .collect()
}

pub struct Arbeitnow {
    client: Client,
    spec: SourceSpec,
}

impl Arbeitnow {
    pub fn new(client: Client, spec: SourceSpec) -> Self {
        Self { client, spec }
    }
}

#[async_trait]
impl JobSource for Arbeitnow {
    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn try_fetch(&self) -> Result<Vec<Job>, SourceError> {
        let response: ArbeitnowResponse =
            fetch_json(&self.client, &self.spec.endpoint, self.spec.ttl).await?;
        Ok(map_jobs(response, &self.spec))
    }
}
