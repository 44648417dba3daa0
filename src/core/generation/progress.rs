//! Shared progress counters with time-gated throughput reporting

use super::summary::GenerationSummary;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How a single work item ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// A well-formed record was produced
    Generated,

    /// A record was produced but its content stayed degraded
    Degraded,

    /// The key already existed
    Skipped,

    /// An unrecoverable error occurred
    Failed,
}

/// Snapshot of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressCounters {
    pub total: u64,
    pub done: u64,
    pub skipped: u64,
    pub bad: u64,
    pub failed: u64,
}

#[derive(Debug)]
struct ProgressState {
    counters: ProgressCounters,
    last_report: Instant,
}

/// Progress tracker shared by all workers of a run
#[derive(Debug)]
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    started: Instant,
    interval: Duration,
    dry_run: bool,
}

impl ProgressTracker {
    /// Creates a tracker for `total` work items
    pub fn new(total: u64, interval: Duration, dry_run: bool) -> Self {
        let now = Instant::now();
        Self {
            state: Mutex::new(ProgressState {
                counters: ProgressCounters {
                    total,
                    ..Default::default()
                },
                last_report: now,
            }),
            started: now,
            interval,
            dry_run,
        }
    }

    /// Records one finished item and reports if the interval has elapsed
    pub fn tick(&self, outcome: TaskOutcome) -> ProgressCounters {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let counters = &mut state.counters;
        counters.done += 1;
        match outcome {
            TaskOutcome::Generated => {}
            TaskOutcome::Degraded => counters.bad += 1,
            TaskOutcome::Skipped => counters.skipped += 1,
            TaskOutcome::Failed => counters.failed += 1,
        }
        let snapshot = *counters;

        let now = Instant::now();
        if now.duration_since(state.last_report) >= self.interval {
            state.last_report = now;
            report(&snapshot, now.duration_since(self.started));
        }

        snapshot
    }

    /// Current counters
    pub fn snapshot(&self) -> ProgressCounters {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .counters
    }

    /// Builds the terminal summary
    pub fn finish(&self, interrupted: bool) -> GenerationSummary {
        let counters = self.snapshot();
        let persisted = if self.dry_run {
            0
        } else {
            counters.done - counters.skipped - counters.failed
        };

        GenerationSummary {
            total: counters.total,
            done: counters.done,
            skipped: counters.skipped,
            persisted,
            bad: counters.bad,
            failed: counters.failed,
            elapsed: self.started.elapsed(),
            dry_run: self.dry_run,
            interrupted,
        }
    }
}

/// Items per second and estimated seconds remaining
///
/// Both are zero until at least one item is done.
fn rate_and_eta(counters: &ProgressCounters, elapsed: Duration) -> (f64, f64) {
    let secs = elapsed.as_secs_f64();
    let throughput = if secs > 0.0 {
        counters.done as f64 / secs
    } else {
        0.0
    };
    let remaining = counters.total.saturating_sub(counters.done);
    let eta_secs = if throughput > 0.0 {
        remaining as f64 / throughput
    } else {
        0.0
    };
    (throughput, eta_secs)
}

fn report(counters: &ProgressCounters, elapsed: Duration) {
    let (throughput, eta_secs) = rate_and_eta(counters, elapsed);

    tracing::info!(
        done = counters.done,
        total = counters.total,
        bad = counters.bad,
        failed = counters.failed,
        throughput = format!("{throughput:.2}/s"),
        eta_secs = eta_secs.round() as u64,
        "Generation progress"
    );
}
