//! PostgreSQL adapter implementing the collaborator traits
//!
//! Base profiles are read from the existing reference tables; combination
//! records live in `rah_schema.rah_combination_profiles`.

use crate::adapters::database::traits::{CombinationStore, ProfileSource, StoreStats};
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::PostgreSQLCombination;
use crate::domain::{CanonicalKey, CombinationRecord, PhysiologyCode, Result, TriadError};
use async_trait::async_trait;
use std::sync::Arc;

const EXISTS_SQL: &str = r#"
    SELECT 1 FROM rah_schema.rah_combination_profiles
    WHERE combo_key = $1
    LIMIT 1
"#;

const CURATED_PROFILE_SQL: &str = r#"
    SELECT profile_text
    FROM rah_schema.rah_base_profiles
    WHERE program_code = $1::int4
    LIMIT 1
"#;

const ITEM_PROFILE_SQL: &str = r#"
    SELECT COALESCE(NULLIF(i.description, ''), i.details) AS txt
    FROM rah_schema.rah_item i
    JOIN rah_schema.rah_item_program ip ON ip.rah_id = i.rah_id
    WHERE ip.program_code = $1::int4
    ORDER BY i.rah_id
    LIMIT 1
"#;

const LIST_CODES_SQL: &str = r#"
    SELECT DISTINCT program_code::float8 AS code
    FROM rah_schema.rah_base_profiles
    WHERE program_code IS NOT NULL
    ORDER BY code
"#;

const UPSERT_SQL: &str = r#"
    INSERT INTO rah_schema.rah_combination_profiles (
        combo_key, rah_ids, combination_title, analysis,
        potential_indications, recommendations, created_at, updated_at
    )
    VALUES ($1, $2::float8[]::numeric(5,2)[], $3, $4, $5, $6, NOW(), NOW())
    ON CONFLICT (combo_key) DO UPDATE SET
        rah_ids = EXCLUDED.rah_ids,
        combination_title = EXCLUDED.combination_title,
        analysis = EXCLUDED.analysis,
        potential_indications = EXCLUDED.potential_indications,
        recommendations = EXCLUDED.recommendations,
        updated_at = NOW()
"#;

const STATS_SQL: &str = r#"
    SELECT
        COUNT(*)::int8 AS total,
        COUNT(*) FILTER (
            WHERE btrim(combination_title) = ''
               OR lower(btrim(combination_title)) = 'combination'
               OR (
                    jsonb_array_length(COALESCE(potential_indications->'Physical', '[]'::jsonb)) = 0
                AND jsonb_array_length(COALESCE(potential_indications->'Psychological/Emotional', '[]'::jsonb)) = 0
                AND jsonb_array_length(COALESCE(potential_indications->'Functional', '[]'::jsonb)) = 0
               )
        )::int8 AS degraded
    FROM rah_schema.rah_combination_profiles
"#;

/// PostgreSQL implementation of [`ProfileSource`] and [`CombinationStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

fn db_error(context: &str, e: tokio_postgres::Error) -> TriadError {
    TriadError::Database(format!("{context}: {e}"))
}

fn profile_error(context: &str, e: tokio_postgres::Error) -> TriadError {
    TriadError::Profile(format!("{context}: {e}"))
}

#[async_trait]
impl ProfileSource for PostgreSQLAdapter {
    async fn get_profile(&self, code: PhysiologyCode) -> Result<String> {
        let client = self.client.get_connection().await?;
        let program_code = code.program_code();

        let curated = client
            .query_opt(CURATED_PROFILE_SQL, &[&program_code])
            .await
            .map_err(|e| profile_error("Curated profile lookup failed", e))?
            .and_then(|row| row.get::<_, Option<String>>(0))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        if let Some(text) = curated {
            return Ok(text);
        }

        let fallback = client
            .query_opt(ITEM_PROFILE_SQL, &[&program_code])
            .await
            .map_err(|e| profile_error("Item profile lookup failed", e))?
            .and_then(|row| row.get::<_, Option<String>>(0))
            .map(|text| text.trim().to_string())
            .unwrap_or_default();

        if fallback.is_empty() {
            tracing::debug!(code = %code, "No base profile found");
        }
        Ok(fallback)
    }

    async fn list_codes(&self) -> Result<Vec<PhysiologyCode>> {
        let client = self.client.get_connection().await?;

        let rows = client
            .query(LIST_CODES_SQL, &[])
            .await
            .map_err(|e| profile_error("Failed to list program codes", e))?;

        rows.iter()
            .map(|row| PhysiologyCode::new(row.get::<_, f64>(0)))
            .collect()
    }
}

#[async_trait]
impl CombinationStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn exists_by_key(&self, key: &CanonicalKey) -> Result<bool> {
        let client = self.client.get_connection().await?;

        let row = client
            .query_opt(EXISTS_SQL, &[&key.as_str()])
            .await
            .map_err(|e| db_error("Existence check failed", e))?;

        Ok(row.is_some())
    }

    async fn upsert(&self, record: &CombinationRecord) -> Result<()> {
        let row = PostgreSQLCombination::from_record(record)?;
        let mut client = self.client.get_connection().await?;

        // Dropping the transaction without commit rolls it back.
        let transaction = client
            .transaction()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        transaction
            .execute(
                UPSERT_SQL,
                &[
                    &row.combo_key,
                    &row.rah_ids,
                    &row.combination_title,
                    &row.analysis,
                    &row.potential_indications,
                    &row.recommendations,
                ],
            )
            .await
            .map_err(|e| db_error("Upsert failed", e))?;

        transaction
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit upsert", e))?;

        tracing::debug!(key = %record.key, "Combination upserted");
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let client = self.client.get_connection().await?;

        let row = client
            .query_one(STATS_SQL, &[])
            .await
            .map_err(|e| db_error("Failed to count combinations", e))?;

        Ok(StoreStats {
            total: row.get::<_, i64>(0).max(0) as u64,
            degraded: row.get::<_, i64>(1).max(0) as u64,
        })
    }
}
