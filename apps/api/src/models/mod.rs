pub mod job;

pub use job::{Job, JobDraft, SourceCounts, SourceInfo};
