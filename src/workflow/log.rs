// src/workflow/log.rs

//! Submission log: in-memory for the current run, persisted for later ones.
//!
//! The persisted file format is plain UTF-8 text, one line per real
//! submission, tab-separated fields in order:
//!
//! ```text
//! scheduler_id <TAB> job_name <TAB> content_identifier
//! ```
//!
//! Append-only; lines are never reordered or rewritten, so the file doubles
//! as a durable audit trail of every submission that actually reached the
//! scheduler. Up-to-date sentinels are never persisted.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::errors::{QdagError, Result};
use crate::workflow::JobId;

/// Outcome recorded for a job resolved during the current run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Handed to the external scheduler; carries the scheduler id.
    Submitted(String),
    /// Outputs already newer than inputs; the scheduler was never called.
    UpToDate,
}

/// In-memory submission log, owned by exactly one workflow instance.
///
/// The workflow is the single source of truth for submission state; jobs do
/// not carry their own "submitted" flag.
#[derive(Debug, Default)]
pub struct SubmissionLog {
    entries: HashMap<JobId, SubmissionOutcome>,
}

impl SubmissionLog {
    pub fn get(&self, id: JobId) -> Option<&SubmissionOutcome> {
        self.entries.get(&id)
    }

    pub fn record(&mut self, id: JobId, outcome: SubmissionOutcome) {
        self.entries.insert(id, outcome);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobId, &SubmissionOutcome)> {
        self.entries.iter().map(|(id, outcome)| (*id, outcome))
    }
}

/// Durable record of one real submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub scheduler_id: String,
    pub job_name: String,
    pub content_id: String,
}

/// Persisted submission store: lookup by content identifier, append-only
/// record. Injected into the submission engine so persistence is swappable.
pub trait SubmissionStore {
    /// Scheduler id of a prior real submission of this command, if any.
    fn lookup(&self, content_id: &str) -> Option<String>;

    /// Durably append one submission record.
    fn record(&mut self, record: &SubmissionRecord) -> Result<()>;
}

/// Append-only file-backed store.
///
/// Existing entries are loaded once at open; each `record` opens, appends
/// and closes the file, so a crash mid-workflow leaves a valid,
/// truncation-free log of everything submitted so far.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    by_content_id: HashMap<String, String>,
}

impl FileStore {
    /// Default log location under the user's home directory.
    pub fn default_path() -> PathBuf {
        home::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".qdag")
            .join("submissions")
    }

    /// Open a store at `path`, loading any entries a previous run left
    /// behind. The file itself is created lazily on the first `record`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let by_content_id = if path.exists() {
            load_entries(&path)?
        } else {
            HashMap::new()
        };

        debug!(path = ?path, entries = by_content_id.len(), "opened submission store");
        Ok(Self { path, by_content_id })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.by_content_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_content_id.is_empty()
    }
}

impl SubmissionStore for FileStore {
    fn lookup(&self, content_id: &str) -> Option<String> {
        self.by_content_id.get(content_id).cloned()
    }

    fn record(&mut self, record: &SubmissionRecord) -> Result<()> {
        let log_write = |source: std::io::Error| QdagError::LogWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(log_write)?;
        }

        // Scoped open/append/close per record: nothing stays open between
        // submissions, and each line is flushed before the next job goes out.
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(log_write)?;
        writeln!(
            file,
            "{}\t{}\t{}",
            record.scheduler_id, record.job_name, record.content_id
        )
        .map_err(log_write)?;
        file.flush().map_err(log_write)?;

        self.by_content_id
            .insert(record.content_id.clone(), record.scheduler_id.clone());
        info!(
            scheduler_id = %record.scheduler_id,
            job = %record.job_name,
            "submission recorded in persisted log"
        );
        Ok(())
    }
}

/// Map-backed store with no persistence (tests, `--no-log`).
#[derive(Debug, Default)]
pub struct MemoryStore {
    by_content_id: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmissionStore for MemoryStore {
    fn lookup(&self, content_id: &str) -> Option<String> {
        self.by_content_id.get(content_id).cloned()
    }

    fn record(&mut self, record: &SubmissionRecord) -> Result<()> {
        self.by_content_id
            .insert(record.content_id.clone(), record.scheduler_id.clone());
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path)
        .with_context(|| format!("opening submission log at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();
    for line_res in reader.lines() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut fields = trimmed.split('\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(scheduler_id), Some(_name), Some(content_id))
                if !scheduler_id.is_empty() && !content_id.is_empty() =>
            {
                map.insert(content_id.to_string(), scheduler_id.to_string());
            }
            _ => {
                warn!(path = ?path, line = %trimmed, "skipping malformed submission log line");
            }
        }
    }

    Ok(map)
}
