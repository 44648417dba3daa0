//! Persistence strategies for generated records

use crate::adapters::database::CombinationStore;
use crate::domain::{CombinationRecord, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Where a worker sends finished records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one record
    async fn persist(&self, record: &CombinationRecord) -> Result<()>;
}

/// Writes records to the combination store
pub struct StoreSink {
    store: Arc<dyn CombinationStore>,
}

impl StoreSink {
    pub fn new(store: Arc<dyn CombinationStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RecordSink for StoreSink {
    async fn persist(&self, record: &CombinationRecord) -> Result<()> {
        self.store.upsert(record).await?;
        tracing::debug!(key = %record.key, title = %record.title, "Record persisted");
        Ok(())
    }
}

/// Discards records, logging what would have been written
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait]
impl RecordSink for DryRunSink {
    async fn persist(&self, record: &CombinationRecord) -> Result<()> {
        tracing::info!(
            key = %record.key,
            title = %record.title,
            degraded = record.is_degraded(),
            "Dry run, record not persisted"
        );
        Ok(())
    }
}
