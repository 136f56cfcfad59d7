// src/workflow/submit.rs

//! Recursive, idempotent submission of a workflow's dependency graph.
//!
//! Recursion naturally expresses "a job's predecessors must be fully
//! resolved first"; the submission log makes the walk safe on diamond
//! shapes (a shared predecessor is visited once per dependent but submitted
//! at most once), and the persisted store extends that guarantee across
//! process runs.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::errors::{QdagError, Result};
use crate::scheduler::{dependency_directive, SchedulerClient, SubmitRequest};
use crate::workflow::log::{SubmissionOutcome, SubmissionRecord, SubmissionStore};
use crate::workflow::{JobId, Workflow};

/// Knobs for one submission pass.
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Optional pause between successive top-level submissions, to respect
    /// external scheduler rate limits.
    pub delay: Option<Duration>,
}

/// What happened to each job during one [`Workflow::submit`] call.
#[derive(Debug, Default)]
pub struct SubmitReport {
    /// Jobs handed to the scheduler this run, with their new ids.
    pub submitted: Vec<(JobId, String)>,
    /// Jobs found in the persisted store, with the prior run's ids.
    pub reused: Vec<(JobId, String)>,
    /// Jobs skipped because their outputs were already fresh.
    pub up_to_date: Vec<JobId>,
    /// Branches that failed: the named job was not resolved, and neither
    /// were dependents that needed its id.
    pub failed: Vec<(JobId, QdagError)>,
}

impl SubmitReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Workflow {
    /// Submit every registered job, predecessors strictly before dependents.
    ///
    /// Each distinct job reaches the scheduler at most once per workflow
    /// instance, however many dependents share it, and jobs present in
    /// `store` from earlier runs are never resubmitted. A failure aborts
    /// only its own dependency subtree; the remaining top-level jobs are
    /// still attempted, and already-logged sibling submissions stay valid.
    ///
    /// Single-threaded and blocking by design: once started, the pass runs
    /// to completion of the reachable graph.
    pub fn submit(
        &mut self,
        client: &mut dyn SchedulerClient,
        store: &mut dyn SubmissionStore,
        options: &SubmitOptions,
    ) -> SubmitReport {
        let mut report = SubmitReport::default();

        for (n, id) in self.job_ids().enumerate().collect::<Vec<_>>() {
            if n > 0 {
                if let Some(delay) = options.delay {
                    thread::sleep(delay);
                }
            }

            debug!(job = %self.job(id).map(|j| j.effective_name()).unwrap_or_default(),
                   "resolving job and its predecessors");
            if let Err(err) = self.recursive_submit(id, client, store, &mut report) {
                error!(
                    job = %self.job(id).map(|j| j.effective_name()).unwrap_or_default(),
                    error = %err,
                    "submission branch failed"
                );
                report.failed.push((id, err));
            }
        }

        report
    }

    /// Resolve `id`'s predecessors, then `id` itself. Returns the dependency
    /// tokens this job contributes to its dependents.
    fn recursive_submit(
        &mut self,
        id: JobId,
        client: &mut dyn SchedulerClient,
        store: &mut dyn SubmissionStore,
        report: &mut SubmitReport,
    ) -> Result<BTreeSet<String>> {
        let deps: Vec<JobId> = self.job(id)?.dependencies().iter().copied().collect();

        let mut dep_ids = BTreeSet::new();
        for dep in deps {
            dep_ids.extend(self.recursive_submit(dep, client, store, report)?);
        }

        self.submit_one(id, dep_ids, client, store, report)
    }

    /// Resolve a single job whose predecessors have all been resolved.
    ///
    /// Returns the tokens the job contributes upward: its scheduler id if it
    /// was (or had previously been) really submitted, nothing if its outputs
    /// were already up to date; dependents must not wait on a no-op.
    fn submit_one(
        &mut self,
        id: JobId,
        dep_ids: BTreeSet<String>,
        client: &mut dyn SchedulerClient,
        store: &mut dyn SubmissionStore,
        report: &mut SubmitReport,
    ) -> Result<BTreeSet<String>> {
        // Inject the wait-list first so the effective resource spec is
        // observable even for jobs later resolved from the log. Replaces any
        // directive from an earlier visit, so diamond re-visits stay
        // idempotent.
        if !dep_ids.is_empty() {
            let directive = dependency_directive(dep_ids.iter().map(String::as_str));
            self.job_mut(id).depend_directive = Some(directive);
        }

        // Within this run: already resolved (shared predecessor re-visit).
        if let Some(outcome) = self.log.get(id) {
            return Ok(match outcome {
                SubmissionOutcome::Submitted(scheduler_id) => {
                    debug!(
                        job = %self.job(id)?.effective_name(),
                        scheduler_id = %scheduler_id,
                        "already submitted in this run"
                    );
                    BTreeSet::from([scheduler_id.clone()])
                }
                SubmissionOutcome::UpToDate => BTreeSet::new(),
            });
        }

        let content_id = self.job(id)?.content_identifier();

        // Across runs: the persisted store knows this command already went
        // out. Reuse the prior id; it still gates dependents.
        if let Some(scheduler_id) = store.lookup(&content_id) {
            info!(
                job = %self.job(id)?.effective_name(),
                scheduler_id = %scheduler_id,
                "found in persisted submission log; not resubmitting"
            );
            self.log
                .record(id, SubmissionOutcome::Submitted(scheduler_id.clone()));
            report.reused.push((id, scheduler_id.clone()));
            return Ok(BTreeSet::from([scheduler_id]));
        }

        // Freshness: skip work whose outputs are already newer than inputs.
        if self.job(id)?.is_up_to_date()? {
            info!(
                job = %self.job(id)?.effective_name(),
                "outputs already up to date; skipping submission"
            );
            self.log.record(id, SubmissionOutcome::UpToDate);
            report.up_to_date.push(id);
            return Ok(BTreeSet::new());
        }

        let job = self.job(id)?;
        let request = SubmitRequest {
            command: job.command.clone(),
            job_name: job.effective_name(),
            resource_spec: job.resource_spec(),
        };

        let scheduler_id = client.submit(&request)?;
        info!(
            job = %request.job_name,
            scheduler_id = %scheduler_id,
            "job submitted to scheduler"
        );

        // Record in memory before touching the file: even a failed append
        // cannot make this run resubmit the job.
        self.log
            .record(id, SubmissionOutcome::Submitted(scheduler_id.clone()));
        report.submitted.push((id, scheduler_id.clone()));

        let record = SubmissionRecord {
            scheduler_id: scheduler_id.clone(),
            job_name: request.job_name.clone(),
            content_id,
        };
        if let Err(err) = store.record(&record) {
            error!(
                job = %request.job_name,
                scheduler_id = %scheduler_id,
                error = %err,
                "scheduler id issued but could not be persisted; idempotency on the next run is broken"
            );
            return Err(err);
        }

        Ok(BTreeSet::from([scheduler_id]))
    }
}
