// src/job/freshness.rs

//! Make-style staleness check at whole-job granularity.
//!
//! A job is one atomic unit: freshness is a single boolean over all of its
//! inputs vs all of its outputs, not a per-file-pair comparison.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use tracing::debug;

use crate::errors::{QdagError, Result};
use crate::job::Job;

/// Decide whether `job`'s outputs are already newer than its inputs.
///
/// Policy:
/// 1. No declared outputs: never up to date (nothing to check against).
/// 2. No declared inputs: up to date iff every output path exists.
/// 3. Both non-empty: up to date iff the newest input is strictly older than
///    the oldest output.
///
/// A stat failure on an *input* is a hard [`QdagError::MissingInput`]: an
/// absent input signals a broken pipeline definition upstream, not a
/// legitimate rebuild trigger. A stat failure on an *output* after the inputs
/// resolved means the output is missing or unreadable, so the job is simply
/// not up to date.
///
/// Pure function of the filesystem; no side effects.
pub fn is_up_to_date(job: &Job) -> Result<bool> {
    if job.outputs.is_empty() {
        return Ok(false);
    }

    if job.inputs.is_empty() {
        return Ok(job.outputs.iter().all(|p| p.exists()));
    }

    let mut newest_input: Option<SystemTime> = None;
    for path in &job.inputs {
        let mtime = mtime_of(path).map_err(|source| QdagError::MissingInput {
            job: job.effective_name(),
            path: path.clone(),
            source,
        })?;
        newest_input = Some(match newest_input {
            Some(t) => t.max(mtime),
            None => mtime,
        });
    }
    let newest_input = match newest_input {
        Some(t) => t,
        // Unreachable with non-empty inputs; rebuild is the safe default.
        None => return Ok(false),
    };

    let mut oldest_output: Option<SystemTime> = None;
    for path in &job.outputs {
        match mtime_of(path) {
            Ok(mtime) => {
                oldest_output = Some(match oldest_output {
                    Some(t) => t.min(mtime),
                    None => mtime,
                });
            }
            Err(err) => {
                debug!(
                    job = %job.effective_name(),
                    path = ?path,
                    error = %err,
                    "output not stat-able; job considered stale"
                );
                return Ok(false);
            }
        }
    }

    match oldest_output {
        Some(oldest) => Ok(newest_input < oldest),
        None => Ok(false),
    }
}

fn mtime_of(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}
