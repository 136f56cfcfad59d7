// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{QdagError, Result};
use crate::job::Job;
use crate::workflow::Workflow;

/// Top-level pipeline definition as read from a TOML file.
///
/// ```toml
/// [workflow]
/// log = "/data/me/.qdag/submissions"
/// delay_ms = 500
///
/// [job.align]
/// command = "bwa aln -t 24 ref.fa in.fq > out.sai"
/// resources = "-l nodes=1:c24"
/// inputs = ["in.fq"]
/// outputs = ["out.sai"]
///
/// [job.sort]
/// command = "samtools sort out.sai"
/// after = ["align"]
/// ```
///
/// The `[workflow]` section is optional and has sensible defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Global options from `[workflow]`.
    #[serde(default)]
    pub workflow: WorkflowSection,

    /// All jobs from `[job.<name>]`. Keys are the job names.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// `[workflow]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WorkflowSection {
    /// Path of the persisted submission log. If absent, the default under
    /// the user's home directory is used.
    #[serde(default)]
    pub log: Option<PathBuf>,

    /// Milliseconds to pause between successive top-level submissions.
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    /// The command handed to the scheduler; opaque to qdag.
    pub command: String,

    /// Raw scheduler resource arguments (e.g. `-l nodes=1:c2`).
    #[serde(default)]
    pub resources: String,

    /// Files the command reads; used by the freshness check.
    #[serde(default)]
    pub inputs: Vec<PathBuf>,

    /// Files the command produces; used by the freshness check.
    #[serde(default)]
    pub outputs: Vec<PathBuf>,

    /// Dependency list: this job waits for all jobs named here.
    #[serde(default)]
    pub after: Vec<String>,
}

impl ConfigFile {
    /// Materialise the configured jobs into a [`Workflow`], wiring `after`
    /// edges.
    ///
    /// Expects a validated config; edge insertion still goes through
    /// [`Workflow::add_dependency`], so self-edges or cycles that slipped
    /// past validation are rejected here as well.
    pub fn build_workflow(&self) -> Result<Workflow> {
        let mut workflow = Workflow::new();
        let mut ids = BTreeMap::new();

        for (name, jc) in &self.job {
            let job = Job::new(jc.command.as_str(), jc.resources.as_str())
                .with_name(name.as_str())
                .with_inputs(jc.inputs.iter().cloned())
                .with_outputs(jc.outputs.iter().cloned());
            ids.insert(name.as_str(), workflow.add_job(job));
        }

        for (name, jc) in &self.job {
            let job_id = ids[name.as_str()];
            for dep in &jc.after {
                let dep_id = *ids.get(dep.as_str()).ok_or_else(|| {
                    QdagError::Config(format!(
                        "job '{name}' has unknown dependency '{dep}' in `after`"
                    ))
                })?;
                workflow.add_dependency(job_id, dep_id)?;
            }
        }

        Ok(workflow)
    }
}
