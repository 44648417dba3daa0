//! Generation coordinator - owns the worker pool for one run
//!
//! The producer enumerates triads onto a bounded queue shared by a fixed
//! number of workers. When enumeration completes it enqueues one stop
//! sentinel per worker; on shutdown it stops enqueuing and lets the workers
//! drain out at their next dequeue.

use super::enumerate::TriadEnumerator;
use super::progress::ProgressTracker;
use super::sink::{DryRunSink, RecordSink, StoreSink};
use super::summary::GenerationSummary;
use super::worker::{run_worker, shutdown_requested, WorkItem, WorkerContext};
use crate::adapters::database::{
    create_backends, create_generator, CombinationStore, ProfileSource,
};
use crate::adapters::generator::Generator;
use crate::config::{GenerationConfig, TriadgenConfig};
use crate::core::payload::PayloadLimits;
use crate::core::throttle::{RateLimiter, Retrier, RetryPolicy};
use crate::domain::{PhysiologyCode, Result, Triad};
use crate::log_error_with_context;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::Instrument;
use uuid::Uuid;

/// What a run should generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// A single caller-supplied triad
    Explicit(Triad),

    /// Every combination of the base code set
    EnumerateAll,
}

/// Generation coordinator
pub struct GenerationCoordinator {
    generation: GenerationConfig,
    dry_run: bool,
    profiles: Arc<dyn ProfileSource>,
    store: Arc<dyn CombinationStore>,
    generator: Arc<dyn Generator>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GenerationCoordinator {
    /// Create a coordinator backed by the configured collaborators
    ///
    /// Ensures the combination schema exists before returning.
    pub async fn new(config: TriadgenConfig, shutdown_rx: watch::Receiver<bool>) -> Result<Self> {
        let backends = create_backends(&config).await?;
        backends.store.ensure_schema().await?;
        let generator = create_generator(&config)?;

        Ok(Self::with_components(
            config.generation,
            config.application.dry_run,
            backends.profiles,
            backends.store,
            generator,
            shutdown_rx,
        ))
    }

    /// Create a coordinator from explicit collaborators
    pub fn with_components(
        generation: GenerationConfig,
        dry_run: bool,
        profiles: Arc<dyn ProfileSource>,
        store: Arc<dyn CombinationStore>,
        generator: Arc<dyn Generator>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        Self {
            generation,
            dry_run,
            profiles,
            store,
            generator,
            shutdown_rx,
        }
    }

    /// Execute one generation run
    ///
    /// # Errors
    ///
    /// Fails before any worker starts if the base code set cannot be
    /// determined. Per-item failures are counted in the summary instead.
    pub async fn execute(&self, mode: RunMode) -> Result<GenerationSummary> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("generation_run", run_id = %run_id);
        self.run(mode).instrument(span).await
    }

    async fn run(&self, mode: RunMode) -> Result<GenerationSummary> {
        let (items, total): (Box<dyn Iterator<Item = Triad> + Send>, u64) = match mode {
            RunMode::Explicit(triad) => (Box::new(std::iter::once(triad)), 1),
            RunMode::EnumerateAll => {
                let enumerator = TriadEnumerator::new(self.base_codes().await?);
                let total = enumerator.total(self.generation.limit);
                if total == 0 {
                    tracing::warn!(
                        base_codes = enumerator.base_codes().len(),
                        "Fewer than 3 base codes, nothing to generate"
                    );
                }
                let limit = self.generation.limit.unwrap_or(usize::MAX);
                (Box::new(enumerator.take(limit)), total)
            }
        };

        let workers = self.generation.workers.max(1);
        let capacity = workers * self.generation.queue_capacity_per_worker.max(1);

        tracing::info!(
            total,
            workers,
            requests_per_second = self.generation.requests_per_second,
            dry_run = self.dry_run,
            retry_bad = self.generation.retry_bad,
            force = self.generation.force,
            "Starting generation"
        );

        let tracker = Arc::new(ProgressTracker::new(
            total,
            Duration::from_secs(self.generation.progress_interval_seconds),
            self.dry_run,
        ));
        let context = Arc::new(self.worker_context(tracker.clone()));
        tracing::debug!(
            max_attempts = context.retrier.policy().max_attempts(),
            queue_capacity = capacity,
            "Worker pool configured"
        );

        let (tx, rx) = mpsc::channel(capacity);
        let queue = Arc::new(Mutex::new(rx));
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    context.clone(),
                    queue.clone(),
                    self.shutdown_rx.clone(),
                ))
            })
            .collect();
        drop(queue);

        let interrupted = produce(tx, items, workers, self.shutdown_rx.clone()).await;

        for result in join_all(handles).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Worker task terminated abnormally");
            }
        }

        let interrupted = interrupted || *self.shutdown_rx.borrow();
        let summary = tracker.finish(interrupted);
        summary.log_summary();
        Ok(summary)
    }

    async fn base_codes(&self) -> Result<Vec<PhysiologyCode>> {
        if !self.generation.base_codes.is_empty() {
            return self
                .generation
                .base_codes
                .iter()
                .map(|value| PhysiologyCode::new(*value))
                .collect();
        }

        let codes = self.profiles.list_codes().await.map_err(|e| {
            log_error_with_context!(&e, "Failed to list base codes, aborting run");
            e
        })?;
        tracing::info!(count = codes.len(), "Loaded base codes from profile source");
        Ok(codes)
    }

    fn worker_context(&self, tracker: Arc<ProgressTracker>) -> WorkerContext {
        let limiter = Arc::new(RateLimiter::new(self.generation.requests_per_second));
        let policy = RetryPolicy::new(
            self.generation.max_retries,
            Duration::from_millis(self.generation.retry_base_delay_ms),
        );
        let sink: Arc<dyn RecordSink> = if self.dry_run {
            Arc::new(DryRunSink)
        } else {
            Arc::new(StoreSink::new(self.store.clone()))
        };

        WorkerContext {
            profiles: self.profiles.clone(),
            generator: self.generator.clone(),
            store: self.store.clone(),
            sink,
            retrier: Retrier::new(policy, limiter),
            tracker,
            limits: PayloadLimits {
                analysis_max_chars: self.generation.analysis_max_chars,
                max_recommendations: self.generation.max_recommendations,
            },
            retry_bad: self.generation.retry_bad,
            force: self.generation.force,
        }
    }
}

/// Enqueues every triad, then one stop sentinel per worker
///
/// Returns `true` if enqueuing was cut short by shutdown.
async fn produce(
    tx: mpsc::Sender<WorkItem>,
    items: impl Iterator<Item = Triad>,
    workers: usize,
    mut shutdown: watch::Receiver<bool>,
) -> bool {
    for triad in items {
        if !enqueue(&tx, WorkItem::Triad(triad), &mut shutdown).await {
            tracing::info!("Shutdown requested, no further triads will be enqueued");
            return true;
        }
    }

    for _ in 0..workers {
        if !enqueue(&tx, WorkItem::Stop, &mut shutdown).await {
            return true;
        }
    }
    false
}

async fn enqueue(
    tx: &mpsc::Sender<WorkItem>,
    item: WorkItem,
    shutdown: &mut watch::Receiver<bool>,
) -> bool {
    tokio::select! {
        biased;
        _ = shutdown_requested(shutdown) => false,
        sent = tx.send(item) => sent.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryStore, StaticProfiles};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for Echo {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"combination": "Axis", "potential_indications": {"Physical": ["Fatigue"]}}"#.to_string())
        }
    }

    fn generation(workers: usize, base_codes: &[f64]) -> GenerationConfig {
        GenerationConfig {
            workers,
            requests_per_second: 1000.0,
            retry_base_delay_ms: 1,
            base_codes: base_codes.to_vec(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_enumerate_all_handles_every_combination_once() {
        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(Echo {
            calls: AtomicUsize::new(0),
        });
        let (_tx, rx) = watch::channel(false);

        let coordinator = GenerationCoordinator::with_components(
            generation(3, &[30.0, 50.0, 64.0, 72.0, 76.0]),
            false,
            Arc::new(StaticProfiles::new()),
            store.clone(),
            generator.clone(),
            rx,
        );

        let summary = coordinator.execute(RunMode::EnumerateAll).await.unwrap();
        assert_eq!(summary.total, 10);
        assert_eq!(summary.done, 10);
        assert_eq!(summary.persisted, 10);
        assert_eq!(store.len().await, 10);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn test_more_workers_than_items() {
        let store = Arc::new(MemoryStore::new());
        let (_tx, rx) = watch::channel(false);

        let coordinator = GenerationCoordinator::with_components(
            generation(8, &[]),
            false,
            Arc::new(StaticProfiles::new()),
            store.clone(),
            Arc::new(Echo {
                calls: AtomicUsize::new(0),
            }),
            rx,
        );

        let triad = Triad::parse("30,50,76").unwrap();
        let summary = coordinator.execute(RunMode::Explicit(triad)).await.unwrap();
        assert_eq!(summary.done, 1);
        assert!(summary.is_successful());
    }
}
