//! Worker loop and per-item processing

use super::progress::{ProgressTracker, TaskOutcome};
use super::sink::RecordSink;
use crate::adapters::database::{CombinationStore, ProfileSource};
use crate::adapters::generator::Generator;
use crate::core::payload::{
    build_context, build_user_prompt, merge_retry, validate, PayloadLimits, Validated,
    SYSTEM_PROMPT,
};
use crate::core::throttle::Retrier;
use crate::domain::{CanonicalKey, Result, Triad};
use crate::log_triad_failure;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

/// Entry on the shared work queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    Triad(Triad),
    /// Tells exactly one worker to exit
    Stop,
}

/// Receiving end of the work queue, shared by all workers
pub type SharedQueue = Arc<Mutex<mpsc::Receiver<WorkItem>>>;

/// Everything a worker needs to process one triad
pub struct WorkerContext {
    pub profiles: Arc<dyn ProfileSource>,
    pub generator: Arc<dyn Generator>,
    pub store: Arc<dyn CombinationStore>,
    pub sink: Arc<dyn RecordSink>,
    pub retrier: Retrier,
    pub tracker: Arc<ProgressTracker>,
    pub limits: PayloadLimits,
    pub retry_bad: bool,
    pub force: bool,
}

impl WorkerContext {
    /// Processes one triad, converting errors into a failed outcome
    pub async fn process(&self, worker: usize, triad: &Triad) -> TaskOutcome {
        let key = triad.canonical_key();

        match self.try_process(triad, &key).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log_triad_failure!(worker, key.as_str(), &e);
                TaskOutcome::Failed
            }
        }
    }

    async fn try_process(&self, triad: &Triad, key: &CanonicalKey) -> Result<TaskOutcome> {
        if !self.force && self.store.exists_by_key(key).await? {
            tracing::debug!(key = %key, "Combination already exists, skipping");
            return Ok(TaskOutcome::Skipped);
        }

        let mut profiles: [String; 3] = Default::default();
        for (slot, code) in profiles.iter_mut().zip(triad.codes()) {
            *slot = self.profiles.get_profile(*code).await?;
        }

        let context = build_context(triad, &profiles);
        let prompt = build_user_prompt(&context);

        let raw = self.generate(&prompt).await?;
        let first = self.validate_logged(key, &raw);

        let validated = if first.is_bad() && self.retry_bad {
            self.retry_bad_output(key, &prompt, first).await
        } else {
            first
        };

        let degraded = validated.is_bad();
        let record = validated.payload.into_record(triad);
        self.sink.persist(&record).await?;

        tracing::info!(key = %key, title = %record.title, degraded, "Combination generated");

        Ok(if degraded {
            TaskOutcome::Degraded
        } else {
            TaskOutcome::Generated
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let generator: &dyn Generator = self.generator.as_ref();
        self.retrier
            .run(move || generator.generate(SYSTEM_PROMPT, prompt))
            .await
    }

    fn validate_logged(&self, key: &CanonicalKey, raw: &str) -> Validated {
        let validated = validate(raw, &self.limits);
        tracing::debug!(
            key = %key,
            parse = validated.outcome.as_str(),
            bad = validated.is_bad(),
            "Generator output validated"
        );
        validated
    }

    async fn retry_bad_output(
        &self,
        key: &CanonicalKey,
        prompt: &str,
        first: Validated,
    ) -> Validated {
        tracing::info!(key = %key, parse = first.outcome.as_str(), "Bad output, retrying once");

        match self.generate(prompt).await {
            Ok(raw) => {
                let retry = self.validate_logged(key, &raw);
                merge_retry(first, retry)
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    error = %e,
                    "Bad-output retry failed, keeping first result"
                );
                first
            }
        }
    }
}

/// Resolves once shutdown has been requested
///
/// Never resolves if the sender is dropped without requesting shutdown.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Pulls items until a stop sentinel, a closed queue or a shutdown request
///
/// Returns the number of triads this worker handled.
pub async fn run_worker(
    id: usize,
    context: Arc<WorkerContext>,
    queue: SharedQueue,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    tracing::debug!(worker = id, "Worker started");
    let mut handled = 0;

    loop {
        let item = {
            let mut receiver = queue.lock().await;
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => None,
                item = receiver.recv() => item,
            }
        };

        match item {
            Some(WorkItem::Triad(triad)) => {
                let outcome = context.process(id, &triad).await;
                context.tracker.tick(outcome);
                handled += 1;
            }
            Some(WorkItem::Stop) => break,
            None => {
                tracing::debug!(worker = id, "Worker stopping early");
                break;
            }
        }
    }

    tracing::debug!(worker = id, handled, "Worker finished");
    handled
}
