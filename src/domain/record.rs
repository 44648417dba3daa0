//! Persisted combination profile
//!
//! A [`CombinationRecord`] is the artifact generated for one triad and stored
//! under its canonical key.

use super::codes::{CanonicalKey, PhysiologyCode, Triad};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to payloads that failed structural validation
pub const SENTINEL_TITLE: &str = "Combination";

/// Potential indications grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indications {
    /// Physical indications
    #[serde(rename = "Physical", default)]
    pub physical: Vec<String>,

    /// Psychological/emotional indications
    #[serde(rename = "Psychological/Emotional", default)]
    pub psychological_emotional: Vec<String>,

    /// Functional indications
    #[serde(rename = "Functional", default)]
    pub functional: Vec<String>,
}

impl Indications {
    /// Group names as they appear on the wire
    pub const GROUPS: [&'static str; 3] = ["Physical", "Psychological/Emotional", "Functional"];

    /// True when all three groups are empty
    pub fn is_empty(&self) -> bool {
        self.physical.is_empty()
            && self.psychological_emotional.is_empty()
            && self.functional.is_empty()
    }

    /// Total number of indications across groups
    pub fn len(&self) -> usize {
        self.physical.len() + self.psychological_emotional.len() + self.functional.len()
    }

    /// Mutable access to a group by its wire name
    pub fn group_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match name {
            "Physical" => Some(&mut self.physical),
            "Psychological/Emotional" => Some(&mut self.psychological_emotional),
            "Functional" => Some(&mut self.functional),
            _ => None,
        }
    }
}

/// Whether generated content is degraded and should be targeted for regeneration
///
/// Content is degraded when its title is missing or equals the sentinel
/// (case-insensitive), or when every indication group is empty.
pub fn is_degraded_content(title: &str, indications: &Indications) -> bool {
    let title = title.trim();
    title.is_empty() || title.eq_ignore_ascii_case(SENTINEL_TITLE) || indications.is_empty()
}

/// Generated artifact for one triad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationRecord {
    /// Canonical key, the sole identity of the record
    pub key: CanonicalKey,

    /// Member codes in ascending order
    pub codes: [PhysiologyCode; 3],

    /// Combination title
    pub title: String,

    /// Short analysis blurb
    pub analysis: String,

    /// Categorized potential indications
    pub indications: Indications,

    /// Rebalancing recommendations
    pub recommendations: Vec<String>,

    /// When the record was first generated
    pub created_at: DateTime<Utc>,

    /// When the content fields were last written
    pub updated_at: DateTime<Utc>,
}

impl CombinationRecord {
    /// Creates a new record for a triad, stamped with the current time
    pub fn new(
        triad: &Triad,
        title: impl Into<String>,
        analysis: impl Into<String>,
        indications: Indications,
        recommendations: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            key: triad.canonical_key(),
            codes: *triad.codes(),
            title: title.into(),
            analysis: analysis.into(),
            indications,
            recommendations,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record carries degraded content
    pub fn is_degraded(&self) -> bool {
        is_degraded_content(&self.title, &self.indications)
    }
}
