//! PostgreSQL row models
//!
//! Maps [`CombinationRecord`] onto the parameter shapes of the
//! `rah_combination_profiles` table.

use crate::domain::{CombinationRecord, Result};
use serde_json::Value;

/// Row for `rah_schema.rah_combination_profiles`
#[derive(Debug, Clone, PartialEq)]
pub struct PostgreSQLCombination {
    /// Canonical key
    pub combo_key: String,

    /// Member codes, cast to `NUMERIC(5,2)[]` on insert
    pub rah_ids: Vec<f64>,

    /// Combination title
    pub combination_title: String,

    /// Analysis blurb
    pub analysis: String,

    /// Indication groups as JSONB
    pub potential_indications: Value,

    /// Recommendations as a JSONB array
    pub recommendations: Value,
}

impl PostgreSQLCombination {
    /// Convert from a domain record
    pub fn from_record(record: &CombinationRecord) -> Result<Self> {
        Ok(Self {
            combo_key: record.key.as_str().to_string(),
            rah_ids: record.codes.iter().map(|code| code.as_f64()).collect(),
            combination_title: record.title.clone(),
            analysis: record.analysis.clone(),
            potential_indications: serde_json::to_value(&record.indications)?,
            recommendations: serde_json::to_value(&record.recommendations)?,
        })
    }
}
