//! Axum route handlers for the Jobs API.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use tokio::task::JoinError;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::envelope::JobsEnvelope;
use crate::jobs::filters::{self, FilterParams, Ordering};
use crate::models::SourceCounts;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

/// Raw query string of `GET /api/jobs`. Every parameter is optional.
#[derive(Debug, Default, Deserialize)]
pub struct JobsQuery {
    pub q: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
    /// `"false"` turns the entry-level filter off; anything else leaves it on.
    pub entry: Option<String>,
    /// `"true"` turns the data-role filter on.
    pub data: Option<String>,
    /// `"true"` turns the US-or-remote filter on.
    pub us: Option<String>,
    pub order: Option<String>,
}

impl JobsQuery {
    pub fn into_params(self, default_ordering: Ordering) -> FilterParams {
        FilterParams {
            query: present(self.q),
            location: present(self.location),
            source: present(self.source),
            entry_only: self.entry.as_deref() != Some("false"),
            data_only: self.data.as_deref() == Some("true"),
            us_only: self.us.as_deref() == Some("true"),
            ordering: self
                .order
                .as_deref()
                .and_then(|o| o.parse().ok())
                .unwrap_or(default_ordering),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/jobs
///
/// Fresh aggregation, filtered server-side by the query string.
/// A query string that does not decode is answered with a degraded envelope.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    query: Result<Query<JobsQuery>, QueryRejection>,
) -> Result<Json<JobsEnvelope>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::InvalidQuery {
        message: rejection.body_text(),
        sources: state.aggregator.empty_counts(),
    })?;
    let params = query.into_params(state.config.default_ordering);
    run_pipeline(&state, params).await.map(Json)
}

/// GET /api/jobs/all
///
/// Fresh aggregation with no filters, for clients that filter locally.
pub async fn handle_all_jobs(
    State(state): State<AppState>,
) -> Result<Json<JobsEnvelope>, AppError> {
    let params = FilterParams {
        ordering: state.config.default_ordering,
        ..Default::default()
    };
    run_pipeline(&state, params).await.map(Json)
}

/// Aggregate → filter → envelope, isolated in its own task so a panic anywhere
/// in the pipeline degrades the response instead of dropping the connection.
async fn run_pipeline(state: &AppState, params: FilterParams) -> Result<JobsEnvelope, AppError> {
    let aggregator = Arc::clone(&state.aggregator);
    let classifier = Arc::clone(&state.classifier);

    let outcome = tokio::spawn(async move {
        let (jobs, counts) = aggregator.aggregate().await;
        let aggregated = jobs.len();
        let jobs = filters::apply(jobs, &params, &classifier);
        info!(aggregated, returned = jobs.len(), "jobs request served");
        JobsEnvelope::build(jobs, counts)
    })
    .await;

    settle(outcome, || state.aggregator.empty_counts())
}

/// Maps an aborted pipeline task onto `AppError::Aggregation`.
fn settle(
    outcome: Result<JobsEnvelope, JoinError>,
    empty_counts: impl FnOnce() -> SourceCounts,
) -> Result<JobsEnvelope, AppError> {
    outcome.map_err(|e| AppError::Aggregation {
        message: e.to_string(),
        sources: empty_counts(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::jobs::aggregator::tests::{StubSource, ALPHA, BETA};
    use crate::jobs::aggregator::Aggregator;
    use crate::jobs::classifier::Classifier;
    use crate::routes::build_router;
    use crate::sources::JobSource;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::IntoResponse,
        Router,
    };
    use tower::ServiceExt;

    fn app(sources: Vec<Arc<dyn JobSource>>) -> Router {
        build_router(AppState {
            config: Config::default(),
            aggregator: Arc::new(Aggregator::new(sources)),
            classifier: Arc::new(Classifier::default()),
        })
    }

    fn two_boards() -> Router {
        app(vec![
            Arc::new(StubSource::ok(ALPHA, vec![("Senior BI Manager", "Remote")])),
            Arc::new(StubSource::ok(BETA, vec![("Junior SQL Analyst", "Austin, TX")])),
        ])
    }

    async fn get_envelope(router: Router, uri: &str) -> JobsEnvelope {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_query_defaults() {
        let params = JobsQuery::default().into_params(Ordering::Recency);
        assert!(params.entry_only);
        assert!(!params.data_only);
        assert!(!params.us_only);
        assert_eq!(params.query, None);
        assert_eq!(params.ordering, Ordering::Recency);
    }

    #[test]
    fn test_query_toggles_and_blank_values() {
        let params = JobsQuery {
            q: Some("  ".to_string()),
            location: Some(" Austin ".to_string()),
            entry: Some("false".to_string()),
            data: Some("true".to_string()),
            us: Some("yes".to_string()),
            order: Some("random".to_string()),
            ..Default::default()
        }
        .into_params(Ordering::Recency);
        assert_eq!(params.query, None);
        assert_eq!(params.location.as_deref(), Some("Austin"));
        assert!(!params.entry_only);
        assert!(params.data_only);
        assert!(!params.us_only);
        assert_eq!(params.ordering, Ordering::Random);
    }

    #[test]
    fn test_entry_values_other_than_false_keep_filter_on() {
        for value in ["true", "0", "False", ""] {
            let params = JobsQuery {
                entry: Some(value.to_string()),
                ..Default::default()
            }
            .into_params(Ordering::Recency);
            assert!(params.entry_only, "entry={value:?}");
        }
    }

    #[tokio::test]
    async fn test_list_jobs_applies_entry_filter_by_default() {
        let env = get_envelope(two_boards(), "/api/jobs").await;
        assert_eq!(env.total, 1);
        assert_eq!(env.jobs[0].title, "Junior SQL Analyst");
        assert_eq!(env.sources.get("alpha"), 1);
        assert_eq!(env.sources.get("beta"), 1);
        assert_eq!(env.error, None);
    }

    #[tokio::test]
    async fn test_list_jobs_entry_false_returns_everything() {
        let env = get_envelope(two_boards(), "/api/jobs?entry=false").await;
        assert_eq!(env.total, 2);
    }

    #[tokio::test]
    async fn test_list_jobs_source_and_query() {
        let env = get_envelope(two_boards(), "/api/jobs?entry=false&source=Alpha").await;
        assert_eq!(env.total, 1);
        assert_eq!(env.jobs[0].source, "Alpha");

        let env = get_envelope(two_boards(), "/api/jobs?entry=false&q=sql").await;
        assert_eq!(env.total, 1);
        assert_eq!(env.jobs[0].title, "Junior SQL Analyst");
    }

    #[tokio::test]
    async fn test_all_jobs_is_unfiltered() {
        let env = get_envelope(two_boards(), "/api/jobs/all?entry=true&q=nothing").await;
        assert_eq!(env.total, 2);
    }

    #[tokio::test]
    async fn test_all_sources_down_is_still_a_valid_envelope() {
        let router = app(vec![
            Arc::new(StubSource::failing(ALPHA)),
            Arc::new(StubSource::failing(BETA)),
        ]);
        let env = get_envelope(router, "/api/jobs").await;
        assert_eq!(env.total, 0);
        assert!(env.jobs.is_empty());
        assert_eq!(env.sources.total(), 0);
        assert_eq!(env.sources.get("alpha"), 0);
    }

    #[tokio::test]
    async fn test_repeated_query_key_still_answers_with_an_envelope() {
        let response = two_boards()
            .oneshot(
                Request::builder()
                    .uri("/api/jobs?q=a&q=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let env: JobsEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(env.total, 0);
        assert!(env.jobs.is_empty());
        assert_eq!(env.sources.get("alpha"), 0);
        assert_eq!(env.sources.get("beta"), 0);
        assert!(env.error.unwrap().contains("duplicate field"));
    }

    #[tokio::test]
    async fn test_panicking_pipeline_settles_as_degraded_envelope() {
        let outcome = tokio::spawn(async {
            if true {
                panic!("pipeline exploded");
            }
            JobsEnvelope::build(vec![], SourceCounts::default())
        })
        .await;
        assert!(outcome.is_err());

        let err = settle(outcome, || SourceCounts::zeroed(["alpha", "beta"])).unwrap_err();
        assert!(matches!(err, AppError::Aggregation { .. }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let env: JobsEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(env.total, 0);
        assert_eq!(env.sources, SourceCounts::zeroed(["alpha", "beta"]));
        assert!(env.error.is_some());
    }

    #[test]
    fn test_settle_passes_through_a_finished_pipeline() {
        let env = JobsEnvelope::build(vec![], SourceCounts::zeroed(["alpha"]));
        let settled = settle(Ok(env.clone()), || unreachable!()).unwrap();
        assert_eq!(settled, env);
    }
}
