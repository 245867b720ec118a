//! Classifier — keyword heuristics over title, tags, type and location.
//!
//! Every predicate is a plain lower-cased substring test: no tokenization and no
//! word boundaries, so "usa" also matches inside longer words. The vocabulary is
//! injected at construction so tests can swap in their own lists.

use crate::models::Job;

// ────────────────────────────────────────────────────────────────────────────
// Default vocabularies
// ────────────────────────────────────────────────────────────────────────────

const DATA_KEYWORDS: &[&str] = &[
    "data",
    "analyst",
    "analytics",
    "sql",
    "bi ",
    "business intelligence",
    "tableau",
    "power bi",
    "looker",
    "etl",
    "warehouse",
    "machine learning",
    "ml ",
    "statistic",
    "scientist",
    "python",
    "dbt",
    "snowflake",
    "bigquery",
    "spark",
    "reporting",
    "insights",
    "quantitative",
    "visualization",
    "metrics",
];

const SENIOR_KEYWORDS: &[&str] = &[
    "senior",
    "sr.",
    "sr ",
    "lead",
    "principal",
    "staff",
    "director",
    "head of",
    "vp",
    "vice president",
    "manager",
    "chief",
];

const ENTRY_KEYWORDS: &[&str] = &[
    "junior",
    "jr.",
    "jr ",
    "entry",
    "entry-level",
    "intern",
    "internship",
    "graduate",
    "grad ",
    "new grad",
    "trainee",
    "apprentice",
    "associate",
    "early career",
    "beginner",
];

const MID_KEYWORDS: &[&str] = &["mid", "intermediate"];

const US_KEYWORDS: &[&str] = &[
    "usa",
    "united states",
    "u.s.",
    "us only",
    "us-only",
    "america",
    "new york",
    "san francisco",
    "seattle",
    "austin",
    "boston",
    "chicago",
    "los angeles",
    "denver",
    "atlanta",
    ", ca",
    ", ny",
    ", tx",
    ", wa",
    ", ma",
    ", il",
    ", co",
    ", ga",
];

/// Keyword lists used by the classifier. All entries must be lower-case.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub data: Vec<String>,
    pub senior: Vec<String>,
    pub entry: Vec<String>,
    pub mid: Vec<String>,
    pub us: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            data: owned(DATA_KEYWORDS),
            senior: owned(SENIOR_KEYWORDS),
            entry: owned(ENTRY_KEYWORDS),
            mid: owned(MID_KEYWORDS),
            us: owned(US_KEYWORDS),
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Predicates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    vocab: Vocabulary,
}

impl Classifier {
    pub fn new(vocab: Vocabulary) -> Self {
        Self { vocab }
    }

    /// Title or any tag mentions a data/analytics keyword.
    pub fn is_data_role(&self, job: &Job) -> bool {
        let haystack = format!("{} {}", job.title, job.tags.join(" ")).to_lowercase();
        contains_any(&haystack, &self.vocab.data)
    }

    /// Title or employment type mentions a seniority keyword.
    pub fn is_senior_role(&self, job: &Job) -> bool {
        let haystack = format!("{} {}", job.title, job.job_type.as_deref().unwrap_or(""))
            .to_lowercase();
        contains_any(&haystack, &self.vocab.senior)
    }

    /// Seniority wins; then an explicit entry marker; then a mid-level marker
    /// excludes. A title with no level signal at all counts as entry-level.
    pub fn is_entry_level(&self, job: &Job) -> bool {
        if self.is_senior_role(job) {
            return false;
        }
        let title = job.title.to_lowercase();
        if contains_any(&title, &self.vocab.entry) {
            return true;
        }
        !contains_any(&title, &self.vocab.mid)
    }

    /// Location names a US place, or is exactly "remote".
    pub fn is_us_or_remote(&self, job: &Job) -> bool {
        let location = job.location.to_lowercase();
        location.trim() == "remote" || contains_any(&location, &self.vocab.us)
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}
