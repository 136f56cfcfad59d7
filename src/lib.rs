// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod job;
pub mod logging;
pub mod scheduler;
pub mod workflow;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{error, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::errors::{QdagError, Result};
use crate::scheduler::QsubClient;
use crate::workflow::{FileStore, MemoryStore, SubmissionStore, SubmitOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - pipeline loading + validation
/// - the persisted submission store (file-backed unless `--no-log`)
/// - the qsub scheduler client
/// - the recursive submission pass
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let mut workflow = cfg.build_workflow()?;

    let mut store: Box<dyn SubmissionStore> = if args.no_log {
        Box::new(MemoryStore::new())
    } else {
        let log_path = args
            .log
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| cfg.workflow.log.clone())
            .unwrap_or_else(FileStore::default_path);
        info!(path = ?log_path, "using persisted submission log");
        Box::new(FileStore::open(log_path)?)
    };

    let delay = args
        .delay_ms
        .or(cfg.workflow.delay_ms)
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);
    let options = SubmitOptions { delay };

    let mut client = QsubClient::new();
    let report = workflow.submit(&mut client, store.as_mut(), &options);

    info!(
        submitted = report.submitted.len(),
        reused = report.reused.len(),
        up_to_date = report.up_to_date.len(),
        failed = report.failed.len(),
        "workflow submission finished"
    );

    if !report.is_success() {
        for (id, err) in &report.failed {
            let name = workflow
                .job(*id)
                .map(|j| j.effective_name())
                .unwrap_or_else(|_| format!("{id:?}"));
            error!(job = %name, error = %err, "submission branch failed");
        }
        return Err(QdagError::Other(anyhow!(
            "{} submission branch(es) failed",
            report.failed.len()
        )));
    }

    Ok(())
}

/// Simple dry-run output: print jobs, dependencies and commands.
fn print_dry_run(cfg: &ConfigFile) {
    println!("qdag dry-run");
    if let Some(ref log) = cfg.workflow.log {
        println!("  workflow.log = {log:?}");
    }
    if let Some(delay_ms) = cfg.workflow.delay_ms {
        println!("  workflow.delay_ms = {delay_ms}");
    }
    println!();

    println!("jobs ({}):", cfg.job.len());
    for (name, job) in cfg.job.iter() {
        println!("  - {name}");
        println!("      command: {}", job.command);
        if !job.resources.is_empty() {
            println!("      resources: {}", job.resources);
        }
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if !job.inputs.is_empty() {
            println!("      inputs: {:?}", job.inputs);
        }
        if !job.outputs.is_empty() {
            println!("      outputs: {:?}", job.outputs);
        }
    }
}
