use std::sync::Arc;

use crate::config::Config;
use crate::jobs::aggregator::Aggregator;
use crate::jobs::classifier::Classifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub aggregator: Arc<Aggregator>,
    /// Keyword classifier. Vocabulary is fixed at startup.
    pub classifier: Arc<Classifier>,
}
