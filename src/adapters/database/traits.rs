//! Collaborator traits for base profiles and combination storage
//!
//! The pipeline only talks to these traits, so PostgreSQL and the in-memory
//! backends are interchangeable.

use crate::domain::{CanonicalKey, CombinationRecord, PhysiologyCode, Result};
use async_trait::async_trait;

/// Record counts reported by a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored records
    pub total: u64,

    /// Records with a sentinel title or no indications
    pub degraded: u64,
}

/// Source of base-profile text for single physiology codes
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Returns descriptive text for one code
    ///
    /// An empty string means no profile is known; that is not an error.
    async fn get_profile(&self, code: PhysiologyCode) -> Result<String>;

    /// Lists the distinct base codes available for enumeration, ascending
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unavailable. The caller treats this
    /// as fatal for the run.
    async fn list_codes(&self) -> Result<Vec<PhysiologyCode>>;
}

/// Keyed store of combination records
#[async_trait]
pub trait CombinationStore: Send + Sync {
    /// Test the store connection
    async fn test_connection(&self) -> Result<()>;

    /// Creates tables and indexes if they don't exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Whether a record exists for the key
    async fn exists_by_key(&self, key: &CanonicalKey) -> Result<bool>;

    /// Inserts the record or fully replaces its content fields
    ///
    /// Atomic per record; `created_at` of an existing record is kept.
    async fn upsert(&self, record: &CombinationRecord) -> Result<()>;

    /// Record counts
    async fn stats(&self) -> Result<StoreStats>;
}
