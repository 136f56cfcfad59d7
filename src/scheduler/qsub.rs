// src/scheduler/qsub.rs

//! Production scheduler client shelling out to `qsub`.

use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, info};

use crate::errors::{QdagError, Result};

use super::{SchedulerClient, SubmitRequest};

/// Blocking `qsub` wrapper.
///
/// The job script is fed on stdin, the name via `-N`, and the resource spec
/// is split on whitespace and passed through as raw arguments (it may
/// already carry an engine-injected `-W depend=...` token). The scheduler id
/// is the first line of stdout, trimmed.
#[derive(Debug, Clone)]
pub struct QsubClient {
    program: String,
}

impl QsubClient {
    pub fn new() -> Self {
        Self {
            program: "qsub".to_string(),
        }
    }

    /// Use an alternative qsub-compatible executable (site wrappers, tests).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for QsubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerClient for QsubClient {
    fn submit(&mut self, request: &SubmitRequest) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-N").arg(&request.job_name);
        if !request.resource_spec.is_empty() {
            cmd.args(request.resource_spec.split_whitespace());
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(job = %request.job_name, program = %self.program, "invoking scheduler");

        let mut child = cmd.spawn().map_err(|e| {
            QdagError::SchedulerUnavailable(format!("spawning {}: {e}", self.program))
        })?;

        // Feed the script from a separate thread while wait_with_output
        // drains stdout/stderr. Writing inline would deadlock once both the
        // script and the child's output exceed the pipe buffers.
        let writer = child.stdin.take().map(|mut stdin| {
            let script = request.command.clone();
            thread::spawn(move || {
                // Drop closes the pipe so qsub sees EOF.
                stdin.write_all(script.as_bytes())
            })
        });

        let output = child.wait_with_output().map_err(|e| {
            QdagError::SchedulerUnavailable(format!("waiting for {}: {e}", self.program))
        })?;

        let script_written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked"))),
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(QdagError::SubmissionRejected {
                job: request.job_name.clone(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        // Checked after the exit status: a rejected job closes stdin early,
        // and that broken pipe is noise next to the real rejection.
        if let Err(e) = script_written {
            return Err(QdagError::SchedulerUnavailable(format!(
                "writing job script to {}: {e}",
                self.program
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let id = stdout.lines().next().map(str::trim).unwrap_or("").to_string();
        if id.is_empty() {
            return Err(QdagError::SubmissionRejected {
                job: request.job_name.clone(),
                reason: "scheduler returned no job id on stdout".to_string(),
            });
        }

        info!(job = %request.job_name, scheduler_id = %id, "scheduler accepted job");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests substitute a small shell script for the real qsub; they
    // exercise id extraction and failure mapping, not PBS itself.

    fn request() -> SubmitRequest {
        SubmitRequest {
            command: "hostname".to_string(),
            job_name: "t".to_string(),
            resource_spec: String::new(),
        }
    }

    #[cfg(unix)]
    fn fake_qsub_script(dir: &tempfile::TempDir, script_body: &str) -> QsubClient {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.path().join("fake-qsub");
        std::fs::write(&script, format!("#!/bin/sh\n{script_body}\n")).unwrap();
        let mut perms = std::fs::metadata(&script).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script, perms).unwrap();
        QsubClient::with_program(script.to_string_lossy().into_owned())
    }

    #[cfg(unix)]
    fn fake_qsub(dir: &tempfile::TempDir, body: &str) -> QsubClient {
        fake_qsub_script(dir, &format!("cat > /dev/null\n{body}"))
    }

    #[test]
    #[cfg(unix)]
    fn first_stdout_line_becomes_the_id() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut client = fake_qsub(&dir, "echo 12345.queue\necho noise");
        assert_eq!(client.submit(&request()).unwrap(), "12345.queue");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let mut client = QsubClient::with_program("definitely-not-a-scheduler");
        match client.submit(&request()) {
            Err(QdagError::SchedulerUnavailable(_)) => {}
            other => panic!("expected SchedulerUnavailable, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn nonzero_exit_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut client = fake_qsub(&dir, "echo broken >&2\nexit 1");
        match client.submit(&request()) {
            Err(QdagError::SubmissionRejected { job, reason }) => {
                assert_eq!(job, "t");
                assert!(reason.contains("broken"));
            }
            other => panic!("expected SubmissionRejected, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn large_script_and_chatty_scheduler_do_not_deadlock() {
        let dir = tempfile::TempDir::new().unwrap();
        // Floods stderr well past a pipe buffer before touching stdin, while
        // the script itself is also larger than a pipe buffer. Both sides
        // must be serviced concurrently for this to terminate.
        let mut client = fake_qsub_script(
            &dir,
            "dd if=/dev/zero bs=1024 count=256 2>/dev/null | tr '\\0' x >&2\n\
             cat > /dev/null\n\
             echo 9001.queue",
        );
        let req = SubmitRequest {
            command: "x".repeat(256 * 1024),
            job_name: "t".to_string(),
            resource_spec: String::new(),
        };
        assert_eq!(client.submit(&req).unwrap(), "9001.queue");
    }

    #[test]
    #[cfg(unix)]
    fn empty_stdout_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut client = fake_qsub(&dir, "true");
        assert!(matches!(
            client.submit(&request()),
            Err(QdagError::SubmissionRejected { .. })
        ));
    }
}
