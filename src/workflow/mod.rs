// src/workflow/mod.rs

//! Workflow: the owning collection of jobs plus submission bookkeeping.
//!
//! - this module holds the job arena and the derived graph relations
//!   (transitive closure, roots, sinks) with edge hardening
//! - [`log`] holds the in-memory submission log and the persisted store
//! - [`submit`] holds the recursive, idempotent submission engine

pub mod log;
pub mod submit;

use std::collections::BTreeSet;

use tracing::debug;

use crate::errors::{QdagError, Result};
use crate::job::Job;

pub use log::{FileStore, MemoryStore, SubmissionLog, SubmissionOutcome, SubmissionRecord, SubmissionStore};
pub use submit::{SubmitOptions, SubmitReport};

/// Handle to a job inside one [`Workflow`]'s arena.
///
/// Only meaningful for the workflow that issued it; the id is the job's
/// identity as a submission unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub(crate) usize);

/// The owning collection of jobs for one run (or repeated idempotent runs).
///
/// The submission log is an instance field, never shared state: two
/// workflows can never cross-contaminate each other's bookkeeping.
#[derive(Debug, Default)]
pub struct Workflow {
    jobs: Vec<Job>,
    pub(crate) log: SubmissionLog,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job and return its handle.
    pub fn add_job(&mut self, job: Job) -> JobId {
        let id = JobId(self.jobs.len());
        debug!(job = %job.effective_name(), id = ?id, "job registered");
        self.jobs.push(job);
        id
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn job(&self, id: JobId) -> Result<&Job> {
        self.jobs.get(id.0).ok_or(QdagError::UnknownJob(id))
    }

    /// All job handles, in registration order.
    pub fn job_ids(&self) -> impl Iterator<Item = JobId> + '_ {
        (0..self.jobs.len()).map(JobId)
    }

    /// In-memory submission log for this workflow instance.
    pub fn submission_log(&self) -> &SubmissionLog {
        &self.log
    }

    /// Make `job` wait for `dep`, updating `dependencies` and the
    /// predecessor's `dependents` together.
    ///
    /// Rejects self-dependencies and any edge that would close a cycle;
    /// both are caught here, at edge-creation time, so the recursive
    /// submission walk can assume the graph is acyclic.
    pub fn add_dependency(&mut self, job: JobId, dep: JobId) -> Result<()> {
        self.check_membership(job)?;
        self.check_membership(dep)?;

        if job == dep {
            return Err(QdagError::SelfDependency {
                job: self.jobs[job.0].effective_name(),
            });
        }

        // job -> dep closes a cycle iff job is already reachable from dep
        // through dependency edges.
        if self.reaches(dep, job) {
            return Err(QdagError::CycleDetected {
                job: self.jobs[job.0].effective_name(),
                dep: self.jobs[dep.0].effective_name(),
            });
        }

        self.jobs[job.0].dependencies.insert(dep);
        self.jobs[dep.0].dependents.insert(job);
        debug!(
            job = %self.jobs[job.0].effective_name(),
            dep = %self.jobs[dep.0].effective_name(),
            "dependency edge added"
        );
        Ok(())
    }

    /// Full transitive closure of `job`'s predecessors. Set semantics: a
    /// predecessor reachable via multiple paths (diamond shapes) appears
    /// once. Worklist walk with a visited set, so deep graphs cannot blow
    /// the call stack.
    pub fn all_dependencies(&self, job: JobId) -> Result<BTreeSet<JobId>> {
        self.check_membership(job)?;

        let mut closure = BTreeSet::new();
        let mut stack: Vec<JobId> = self.jobs[job.0].dependencies.iter().copied().collect();

        while let Some(id) = stack.pop() {
            if closure.insert(id) {
                stack.extend(self.jobs[id.0].dependencies.iter().copied());
            }
        }

        Ok(closure)
    }

    /// Jobs with no predecessors.
    pub fn roots_with_no_dependencies(&self) -> Vec<JobId> {
        self.job_ids()
            .filter(|id| self.jobs[id.0].dependencies.is_empty())
            .collect()
    }

    /// Jobs nothing depends on.
    pub fn sinks_with_no_dependents(&self) -> Vec<JobId> {
        self.job_ids()
            .filter(|id| self.jobs[id.0].dependents.is_empty())
            .collect()
    }

    pub(crate) fn job_mut(&mut self, id: JobId) -> &mut Job {
        &mut self.jobs[id.0]
    }

    fn check_membership(&self, id: JobId) -> Result<()> {
        if id.0 < self.jobs.len() {
            Ok(())
        } else {
            Err(QdagError::UnknownJob(id))
        }
    }

    /// Whether `target` is reachable from `from` through dependency edges.
    fn reaches(&self, from: JobId, target: JobId) -> bool {
        let mut stack = vec![from];
        let mut visited: BTreeSet<JobId> = BTreeSet::new();

        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if visited.insert(id) {
                stack.extend(self.jobs[id.0].dependencies.iter().copied());
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Job {
        Job::new(format!("echo {name}"), "").with_name(name)
    }

    /// A -> B, A -> C, B -> D, C -> D (arrows point dependency -> dependent).
    fn diamond() -> (Workflow, JobId, JobId, JobId, JobId) {
        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        let b = wf.add_job(named("b"));
        let c = wf.add_job(named("c"));
        let d = wf.add_job(named("d"));
        wf.add_dependency(b, a).unwrap();
        wf.add_dependency(c, a).unwrap();
        wf.add_dependency(d, b).unwrap();
        wf.add_dependency(d, c).unwrap();
        (wf, a, b, c, d)
    }

    #[test]
    fn diamond_closure_has_no_duplicates() {
        let (wf, a, b, c, d) = diamond();
        let closure = wf.all_dependencies(d).unwrap();
        assert_eq!(closure, BTreeSet::from([a, b, c]));
    }

    #[test]
    fn edge_updates_both_sides() {
        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        let b = wf.add_job(named("b"));
        wf.add_dependency(b, a).unwrap();

        assert!(wf.job(b).unwrap().dependencies().contains(&a));
        assert!(wf.job(a).unwrap().dependents().contains(&b));
        assert!(wf.job(a).unwrap().dependencies().is_empty());
        assert!(wf.job(b).unwrap().dependents().is_empty());
    }

    #[test]
    fn roots_and_sinks() {
        let (wf, a, _b, _c, d) = diamond();
        assert_eq!(wf.roots_with_no_dependencies(), vec![a]);
        assert_eq!(wf.sinks_with_no_dependents(), vec![d]);
    }

    #[test]
    fn self_dependency_is_rejected() {
        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        match wf.add_dependency(a, a) {
            Err(QdagError::SelfDependency { job }) => assert_eq!(job, "a"),
            other => panic!("expected SelfDependency, got {other:?}"),
        }
    }

    #[test]
    fn direct_cycle_is_rejected() {
        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        let b = wf.add_job(named("b"));
        wf.add_dependency(b, a).unwrap();
        assert!(matches!(
            wf.add_dependency(a, b),
            Err(QdagError::CycleDetected { .. })
        ));
    }

    #[test]
    fn transitive_cycle_is_rejected() {
        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        let b = wf.add_job(named("b"));
        let c = wf.add_job(named("c"));
        wf.add_dependency(b, a).unwrap();
        wf.add_dependency(c, b).unwrap();
        assert!(matches!(
            wf.add_dependency(a, c),
            Err(QdagError::CycleDetected { .. })
        ));
        // The rejected edge must not have been half-applied.
        assert!(wf.job(a).unwrap().dependencies().is_empty());
        assert!(wf.job(c).unwrap().dependents().is_empty());
    }

    #[test]
    fn foreign_job_id_is_rejected() {
        let mut other = Workflow::new();
        other.add_job(named("x"));
        other.add_job(named("y"));
        let foreign = other.add_job(named("z"));

        let mut wf = Workflow::new();
        let a = wf.add_job(named("a"));
        assert!(matches!(
            wf.add_dependency(a, foreign),
            Err(QdagError::UnknownJob(_))
        ));
        assert!(matches!(
            wf.all_dependencies(foreign),
            Err(QdagError::UnknownJob(_))
        ));
    }
}
