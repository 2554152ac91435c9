//! Run timing and the human-readable summary block.

use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Start/finish timestamps for one run.
///
/// Written only by the orchestrating task, never by workers: `begin` fires
/// on entry to `execute`, `end` after the last wave joins.
#[derive(Debug, Default)]
pub struct RunReport {
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the run start.
    pub fn begin(&mut self) {
        self.started_at = Some(Utc::now());
    }

    /// Stamp the run finish.
    pub fn end(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Fold timestamps and counts into a [`RunSummary`].
    ///
    /// Errors if `begin`/`end` never ran, which would mean the caller is
    /// summarizing a run that never happened.
    pub fn summarize(&self, total_ops: u64, error_count: u64) -> Result<RunSummary> {
        let started_at = self.started_at.context("run was never started")?;
        let finished_at = self.finished_at.context("run was never finished")?;
        Ok(RunSummary {
            started_at,
            finished_at,
            total_ops,
            error_count,
        })
    }
}

/// Final outcome of one load run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total_ops: u64,
    pub error_count: u64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Started:  {}",
            self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(
            f,
            "Finished: {}",
            self.finished_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f)?;
        writeln!(f, "Total Operations: {}", self.total_ops)?;
        write!(f, "Total Errors:     {}", self.error_count)
    }
}
