// Aggregation → filter/search → envelope pipeline behind the jobs endpoints.
// Sources live in `crate::sources`; everything here is pure except the aggregator.

pub mod aggregator;
pub mod classifier;
pub mod envelope;
pub mod filters;
pub mod handlers;
