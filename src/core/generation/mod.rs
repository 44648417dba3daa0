//! Generation pipeline: enumeration, worker pool, progress and persistence

pub mod coordinator;
pub mod enumerate;
pub mod progress;
pub mod sink;
pub mod summary;
pub mod worker;

pub use coordinator::{GenerationCoordinator, RunMode};
pub use enumerate::{combination_count, TriadEnumerator};
pub use progress::{ProgressCounters, ProgressTracker, TaskOutcome};
pub use sink::{DryRunSink, RecordSink, StoreSink};
pub use summary::GenerationSummary;
pub use worker::{WorkItem, WorkerContext};
