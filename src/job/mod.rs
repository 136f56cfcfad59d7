// src/job/mod.rs

//! Job data model: one unit of work handed to the batch scheduler.

pub mod freshness;
pub mod identity;

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::errors::Result;
use crate::workflow::JobId;

/// One unit of work: an opaque command, its declared input/output files, and
/// the resource request forwarded to the scheduler.
///
/// Jobs are owned by a [`Workflow`](crate::workflow::Workflow) arena and
/// referred to by [`JobId`]; two jobs are the same submission unit exactly
/// when they are the same arena slot. Every job starts with freshly
/// constructed empty edge sets; `dependencies` and `dependents` are kept
/// exact inverses of each other by
/// [`Workflow::add_dependency`](crate::workflow::Workflow::add_dependency),
/// the only place edges are mutated.
#[derive(Debug, Clone)]
pub struct Job {
    /// Command text to run; never parsed by the engine.
    pub command: String,
    /// Files the command reads. Order carries no meaning.
    pub inputs: Vec<PathBuf>,
    /// Files the command produces.
    pub outputs: Vec<PathBuf>,
    /// Optional human label; [`Job::effective_name`] falls back to a label
    /// derived from the content identifier.
    pub name: Option<String>,

    /// Base resource request (raw scheduler arguments, e.g. `-l nodes=1:c2`),
    /// opaque to the engine.
    resources: String,

    pub(crate) dependencies: BTreeSet<JobId>,
    pub(crate) dependents: BTreeSet<JobId>,

    /// Dependency directive injected by the submission engine. Kept apart
    /// from the base resources so that re-injection on a diamond re-visit
    /// replaces the directive instead of accumulating copies.
    pub(crate) depend_directive: Option<String>,
}

impl Job {
    pub fn new(command: impl Into<String>, resources: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            name: None,
            resources: resources.into(),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            depend_directive: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, P>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Stable digest of the command with all whitespace stripped; the
    /// cross-run identity key used by the persisted submission log.
    pub fn content_identifier(&self) -> String {
        identity::content_identifier(&self.command)
    }

    /// The explicit name, or `J` followed by the first 10 hex characters of
    /// the content identifier when no name was given.
    pub fn effective_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("J{}", &self.content_identifier()[..10]),
        }
    }

    /// Resource spec as handed to the scheduler: the base resources plus any
    /// dependency directive injected by the submission engine.
    pub fn resource_spec(&self) -> String {
        match &self.depend_directive {
            Some(directive) if self.resources.is_empty() => directive.clone(),
            Some(directive) => format!("{} {}", self.resources, directive),
            None => self.resources.clone(),
        }
    }

    /// Direct predecessors of this job.
    pub fn dependencies(&self) -> &BTreeSet<JobId> {
        &self.dependencies
    }

    /// Jobs that depend on this one. Back-reference only; never an ownership
    /// edge.
    pub fn dependents(&self) -> &BTreeSet<JobId> {
        &self.dependents
    }

    /// Whether this job's outputs are already newer than its inputs.
    /// See [`freshness::is_up_to_date`] for the exact policy.
    pub fn is_up_to_date(&self) -> Result<bool> {
        freshness::is_up_to_date(self)
    }
}
