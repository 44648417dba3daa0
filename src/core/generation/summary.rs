//! Generation summary and reporting

use std::time::Duration;

/// Summary of a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    /// Work items planned for the run
    pub total: u64,

    /// Items handled, whatever the outcome
    pub done: u64,

    /// Items skipped because the key already existed
    pub skipped: u64,

    /// Records written to the store
    pub persisted: u64,

    /// Records that stayed degraded after validation and retry
    pub bad: u64,

    /// Items that failed with an unrecoverable error
    pub failed: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Whether persistence was skipped
    pub dry_run: bool,

    /// Whether the run was stopped by a shutdown request
    pub interrupted: bool,
}

impl GenerationSummary {
    /// Check if the run completed with no failures
    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.interrupted
    }

    /// Items that did not fail, as a percentage of items handled
    pub fn success_rate(&self) -> f64 {
        if self.done == 0 {
            return 100.0;
        }
        ((self.done - self.failed) as f64 / self.done as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            done = self.done,
            skipped = self.skipped,
            persisted = self.persisted,
            bad = self.bad,
            failed = self.failed,
            elapsed_secs = self.elapsed.as_secs_f64(),
            dry_run = self.dry_run,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Generation completed"
        );

        if self.interrupted {
            tracing::warn!(
                remaining = self.total.saturating_sub(self.done),
                "Generation interrupted before all work was attempted"
            );
        }
        if self.bad > 0 {
            tracing::warn!(
                bad = self.bad,
                "Some records were stored with degraded content and can be regenerated with --force"
            );
        }
    }
}
