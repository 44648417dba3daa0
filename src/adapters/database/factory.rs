//! Backend factory
//!
//! Builds the profile source, combination store and generator selected by
//! the configuration.

use crate::adapters::database::traits::{CombinationStore, ProfileSource};
use crate::adapters::generator::{Generator, OllamaGenerator};
use crate::adapters::memory::{MemoryStore, StaticProfiles};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::config::schema::{DatabaseTarget, TriadgenConfig};
use crate::domain::{Result, TriadError};
use std::sync::Arc;

/// Collaborators backed by the configured database target
#[derive(Clone)]
pub struct Backends {
    /// Base-profile lookup
    pub profiles: Arc<dyn ProfileSource>,

    /// Combination record store
    pub store: Arc<dyn CombinationStore>,
}

/// Create the profile source and store for the configured target
///
/// For PostgreSQL both share one connection pool.
///
/// # Errors
///
/// Returns an error if the target's configuration is missing or the pool
/// cannot be created.
pub async fn create_backends(config: &TriadgenConfig) -> Result<Backends> {
    match config.database_target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                TriadError::Configuration(
                    "postgresql configuration is required when database_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            let adapter = Arc::new(PostgreSQLAdapter::new(client));
            tracing::info!(
                target_db = %adapter.client().connection_string_safe(),
                "Created PostgreSQL backends"
            );

            Ok(Backends {
                profiles: adapter.clone() as Arc<dyn ProfileSource>,
                store: adapter as Arc<dyn CombinationStore>,
            })
        }
        DatabaseTarget::Memory => {
            tracing::info!("Using in-memory store, no base profiles available");
            Ok(Backends {
                profiles: Arc::new(StaticProfiles::new()),
                store: Arc::new(MemoryStore::new()),
            })
        }
    }
}

/// Create the configured generator
pub fn create_generator(config: &TriadgenConfig) -> Result<Arc<dyn Generator>> {
    let generator = OllamaGenerator::new(&config.generator)?;
    tracing::info!(
        base_url = %config.generator.base_url,
        model = %generator.model(),
        "Created Ollama generator"
    );
    Ok(Arc::new(generator))
}
