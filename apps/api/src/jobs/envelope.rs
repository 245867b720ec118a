use serde::{Deserialize, Serialize};

use crate::models::{Job, SourceCounts};

/// Response body for every jobs endpoint.
///
/// `error` is only present on a degraded response; callers check `total` and
/// `error` rather than the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsEnvelope {
    pub jobs: Vec<Job>,
    pub total: usize,
    pub sources: SourceCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobsEnvelope {
    pub fn build(jobs: Vec<Job>, sources: SourceCounts) -> Self {
        Self {
            total: jobs.len(),
            jobs,
            sources,
            error: None,
        }
    }

    /// Empty, error-flagged envelope with every source counted as zero.
    pub fn degraded(sources: SourceCounts, message: impl Into<String>) -> Self {
        Self {
            jobs: Vec::new(),
            total: 0,
            sources,
            error: Some(message.into()),
        }
    }
}
