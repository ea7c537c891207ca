//! Process-wide `tracing` setup.
//!
//! The full-screen console owns the terminal, so it logs to a file; headless
//! commands log to stderr.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

const FALLBACK_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Parse the configured directive, falling back to `info` when it is invalid.
pub fn build_filter(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (
            EnvFilter::new(FALLBACK_FILTER),
            Some(format!("invalid log filter {directive:?}: {e}")),
        ),
    }
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init_logging(config: &ObservabilityConfig, target: &LogTarget) -> Result<()> {
    let (filter, problem) = build_filter(&config.log_level);

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))?;
        }
    }

    if let Some(problem) = problem {
        tracing::warn!("{problem}; using {FALLBACK_FILTER}");
    }
    Ok(())
}
