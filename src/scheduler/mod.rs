// src/scheduler/mod.rs

//! Boundary to the external batch scheduler.
//!
//! The submission engine only ever talks to the narrow [`SchedulerClient`]
//! capability; [`qsub::QsubClient`] is the production implementation, and
//! tests substitute a recording fake.

pub mod qsub;

use crate::errors::Result;

pub use qsub::QsubClient;

/// What the engine hands to the scheduler for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Job script / command text, passed through verbatim.
    pub command: String,
    /// Name the job appears under in the queue.
    pub job_name: String,
    /// Raw scheduler arguments, including any injected dependency directive.
    pub resource_spec: String,
}

/// Narrow capability the submission engine depends on.
pub trait SchedulerClient {
    /// Submit one job; returns the scheduler's opaque id for it.
    ///
    /// Fails with `SchedulerUnavailable` when the scheduler cannot be
    /// reached at all, or `SubmissionRejected` when it refused the job.
    /// Either is fatal for the submission branch being walked.
    fn submit(&mut self, request: &SubmitRequest) -> Result<String>;
}

/// PBS-style wait-list directive: defer execution until all listed jobs
/// reach a terminal state, whether they succeeded or failed ("run after,
/// regardless of outcome").
pub fn dependency_directive<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined: Vec<&str> = ids.into_iter().collect();
    format!("-W depend=afterany:{}", joined.join(":"))
}
