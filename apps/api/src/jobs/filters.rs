//! Filter/search pipeline — narrows an aggregated job set per request and orders it.

use std::str::FromStr;

use crate::jobs::classifier::Classifier;
use crate::models::Job;

/// How a filtered result set is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    /// Most recent `posted` first. Undated jobs keep their original slot.
    #[default]
    Recency,
    /// Shuffled. Opt-in only.
    Random,
}

impl FromStr for Ordering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "recency" => Ok(Ordering::Recency),
            "random" => Ok(Ordering::Random),
            other => Err(format!("unknown ordering '{other}'")),
        }
    }
}

/// Request-level filter settings. Blank text filters must already be `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub query: Option<String>,
    pub location: Option<String>,
    pub source: Option<String>,
    pub data_only: bool,
    pub entry_only: bool,
    pub us_only: bool,
    pub ordering: Ordering,
}

/// Applies every active filter as an AND-chain, then orders the survivors.
///
/// Cheap exact/substring checks run before the classifier stages.
pub fn apply(jobs: Vec<Job>, params: &FilterParams, classifier: &Classifier) -> Vec<Job> {
    let query = params.query.as_deref().map(str::to_lowercase);
    let location = params.location.as_deref().map(str::to_lowercase);

    let filtered: Vec<Job> = jobs
        .into_iter()
        .filter(|job| params.source.as_deref().map_or(true, |s| job.source == s))
        .filter(|job| {
            location
                .as_deref()
                .map_or(true, |l| job.location.to_lowercase().contains(l))
        })
        .filter(|job| query.as_deref().map_or(true, |q| matches_query(job, q)))
        .filter(|job| !params.data_only || classifier.is_data_role(job))
        .filter(|job| !params.entry_only || classifier.is_entry_level(job))
        .filter(|job| !params.us_only || classifier.is_us_or_remote(job))
        .collect();

    order(filtered, params.ordering)
}

/// Case-insensitive match against title, company, or any tag. `query` is lower-case.
fn matches_query(job: &Job, query: &str) -> bool {
    job.title.to_lowercase().contains(query)
        || job.company.to_lowercase().contains(query)
        || job.tags.iter().any(|t| t.to_lowercase().contains(query))
}

pub fn order(mut jobs: Vec<Job>, ordering: Ordering) -> Vec<Job> {
    match ordering {
        Ordering::Recency => sort_by_recency(jobs),
        Ordering::Random => {
            fastrand::shuffle(&mut jobs);
            jobs
        }
    }
}

/// Sorts dated jobs most-recent-first within the slots dated jobs occupy.
/// An undated job compares equal to everything, so it never moves.
fn sort_by_recency(jobs: Vec<Job>) -> Vec<Job> {
    let len = jobs.len();
    let mut dated = Vec::with_capacity(len);
    let mut undated = Vec::new();

    for (slot, job) in jobs.into_iter().enumerate() {
        if job.posted.is_some() {
            dated.push(job);
        } else {
            undated.push((slot, job));
        }
    }

    // Stable: equal timestamps keep insertion order.
    dated.sort_by(|a, b| b.posted.cmp(&a.posted));

    let mut dated = dated.into_iter();
    let mut undated = undated.into_iter().peekable();
    let mut ordered = Vec::with_capacity(len);

    for slot in 0..len {
        let pinned = undated.next_if(|(at, _)| *at == slot).map(|(_, job)| job);
        ordered.extend(pinned.or_else(|| dated.next()));
    }
    ordered
}
