//! Jobicy — camelCase payload filtered upstream by tag; industries double as tags.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::models::job::{normalize_posted, salary_range};
use crate::models::{Job, JobDraft, SourceInfo};
use crate::sources::{
    decode_records, fetch_json, null_as_default, Amount, JobSource, NativeId, SourceError,
    SourceSpec,
};

pub const INFO: SourceInfo = SourceInfo {
    key: "jobicy",
    name: "Jobicy",
    home_url: "https://jobicy.com/jobs",
};

pub const DEFAULT_URL: &str = "https://jobicy.com/api/v2/remote-jobs";

/// Upstream tag used to pre-filter postings.
pub const TAG: &str = "data";

pub fn spec(endpoint: &str) -> SourceSpec {
    SourceSpec {
        endpoint: endpoint.to_string(),
        ttl: Duration::from_secs(300),
        skip: 0,
        limit: 50,
    }
}

#[derive(Debug, Deserialize)]
struct JobicyResponse {
    jobs: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JobicyJob {
    id: Option<NativeId>,
    url: Option<String>,
    job_slug: Option<String>,
    job_title: Option<String>,
    company_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    job_industry: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    job_type: Vec<String>,
    job_geo: Option<String>,
    pub_date: Option<String>,
    annual_salary_min: Option<Amount>,
    annual_salary_max: Option<Amount>,
}

impl JobicyJob {
    fn into_job(self) -> Job {
        let industries: Vec<String> = self.job_industry.iter().map(|i| unescape(i)).collect();
        let url = self.url.or_else(|| {
            self.job_slug
                .as_deref()
                .map(|s| format!("{}/{s}", INFO.home_url))
        });

        JobDraft {
            native_id: self.id.map(|id| id.to_string()),
            title: self.job_title.as_deref().map(unescape),
            company: self.company_name.as_deref().map(unescape),
            location: self.job_geo,
            job_type: self.job_type.first().cloned(),
            salary: salary_range(
                self.annual_salary_min.as_ref().and_then(Amount::as_u64),
                self.annual_salary_max.as_ref().and_then(Amount::as_u64),
            ),
            url,
            posted: self.pub_date.as_deref().map(normalize_posted),
            category: industries.first().cloned(),
            tags: industries,
        }
        .into_job(&INFO)
    }
}

/// Jobicy HTML-escapes ampersands in free-text fields.
fn unescape(text: &str) -> String {
    text.replace("&amp;", "&")
}

fn map_jobs(response: JobicyResponse, spec: &SourceSpec) -> Vec<Job> {
    let records = response.jobs.into_iter().skip(spec.skip).take(spec.limit);
    decode_records::<JobicyJob>(INFO.key, records)
        .into_iter()
        .map(JobicyJob::into_job)
        .collect()
}

pub struct Jobicy {
    client: Client,
    spec: SourceSpec,
}

impl Jobicy {
    pub fn new(client: Client, spec: SourceSpec) -> Self {
        Self { client, spec }
    }
}

#[async_trait]
impl JobSource for Jobicy {
    fn info(&self) -> &SourceInfo {
        &INFO
    }

    async fn try_fetch(&self) -> Result<Vec<Job>, SourceError> {
        let url = format!("{}?count={}&tag={TAG}", self.spec.endpoint, self.spec.limit);
        let response: JobicyResponse = fetch_json(&self.client, &url, self.spec.ttl).await?;
        Ok(map_jobs(response, &self.spec))
    }
}
