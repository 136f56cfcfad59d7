// src/errors.rs

//! Crate-wide error taxonomy and result alias.

use std::path::PathBuf;

use thiserror::Error;

use crate::workflow::JobId;

#[derive(Error, Debug)]
pub enum QdagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("job id {0:?} does not belong to this workflow")]
    UnknownJob(JobId),

    #[error("job '{job}' cannot depend on itself")]
    SelfDependency { job: String },

    #[error("making '{job}' depend on '{dep}' would create a cycle")]
    CycleDetected { job: String, dep: String },

    #[error("cannot stat input {path:?} of job '{job}'")]
    MissingInput {
        job: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scheduler unavailable: {0}")]
    SchedulerUnavailable(String),

    #[error("scheduler rejected job '{job}': {reason}")]
    SubmissionRejected { job: String, reason: String },

    #[error("failed to append to submission log at {path:?}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, QdagError>;
