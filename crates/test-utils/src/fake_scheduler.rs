use qdag::errors::{QdagError, Result};
use qdag::scheduler::{SchedulerClient, SubmitRequest};

/// A fake scheduler that records every request it accepts and hands out
/// sequential ids (`fake-1`, `fake-2`, ...). Individual job names can be
/// primed to fail with `SubmissionRejected`.
#[derive(Debug, Default)]
pub struct FakeScheduler {
    submissions: Vec<SubmitRequest>,
    fail_jobs: Vec<String>,
    counter: usize,
}

impl FakeScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make submissions for this job name fail.
    pub fn fail_job(mut self, name: &str) -> Self {
        self.fail_jobs.push(name.to_string());
        self
    }

    /// Requests accepted so far, in submission order.
    pub fn submissions(&self) -> &[SubmitRequest] {
        &self.submissions
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submissions.iter().map(|r| r.job_name.clone()).collect()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    /// The request recorded for `name`, if it was submitted.
    pub fn request_for(&self, name: &str) -> Option<&SubmitRequest> {
        self.submissions.iter().find(|r| r.job_name == name)
    }
}

impl SchedulerClient for FakeScheduler {
    fn submit(&mut self, request: &SubmitRequest) -> Result<String> {
        if self.fail_jobs.iter().any(|n| n == &request.job_name) {
            return Err(QdagError::SubmissionRejected {
                job: request.job_name.clone(),
                reason: "primed to fail".to_string(),
            });
        }
        self.counter += 1;
        self.submissions.push(request.clone());
        Ok(format!("fake-{}", self.counter))
    }
}
