//! Generator output validation and repair
//!
//! Raw generator text is turned into a [`CombinationPayload`] without ever
//! failing. Parsing is attempted directly, then on the outermost `{...}` span,
//! and finally falls back to a degraded payload carrying the sentinel title.

use crate::domain::{is_degraded_content, CombinationRecord, Indications, Triad, SENTINEL_TITLE};
use serde::Serialize;
use serde_json::{Map, Value};

/// Bounds applied while normalizing a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLimits {
    /// Maximum characters of raw text kept as analysis in a degraded payload
    pub analysis_max_chars: usize,

    /// Maximum number of recommendations kept
    pub max_recommendations: usize,
}

impl Default for PayloadLimits {
    fn default() -> Self {
        Self {
            analysis_max_chars: 2000,
            max_recommendations: 12,
        }
    }
}

/// Which parse path produced a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The whole text was a JSON object
    Direct,
    /// A JSON object was recovered from surrounding prose
    Extracted,
    /// Nothing parseable, sentinel payload synthesized
    Degraded,
}

impl ParseOutcome {
    /// Short name used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseOutcome::Direct => "direct",
            ParseOutcome::Extracted => "extracted",
            ParseOutcome::Degraded => "degraded",
        }
    }
}

/// Normalized generator output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinationPayload {
    /// Combination title
    pub combination: String,

    /// Analysis blurb
    pub analysis: String,

    /// All three groups, always present
    pub potential_indications: Indications,

    /// Recommendations, capped
    pub recommendations: Vec<String>,
}

impl CombinationPayload {
    /// Whether this payload should be treated as bad output
    pub fn is_bad(&self) -> bool {
        is_degraded_content(&self.combination, &self.potential_indications)
    }

    fn title_is_bad(&self) -> bool {
        let title = self.combination.trim();
        title.is_empty() || title.eq_ignore_ascii_case(SENTINEL_TITLE)
    }

    /// Converts the payload into a record for the given triad
    pub fn into_record(self, triad: &Triad) -> CombinationRecord {
        CombinationRecord::new(
            triad,
            self.combination,
            self.analysis,
            self.potential_indications,
            self.recommendations,
        )
    }
}

/// A payload together with the path that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub payload: CombinationPayload,
    pub outcome: ParseOutcome,
}

impl Validated {
    /// Whether the payload is bad output
    pub fn is_bad(&self) -> bool {
        self.payload.is_bad()
    }
}

/// Validates raw generator text, repairing or degrading as needed
pub fn validate(raw: &str, limits: &PayloadLimits) -> Validated {
    if let Some(object) = parse_object(raw) {
        return Validated {
            payload: normalize(object, limits),
            outcome: ParseOutcome::Direct,
        };
    }

    if let Some(object) = extract_object(raw).and_then(parse_object) {
        return Validated {
            payload: normalize(object, limits),
            outcome: ParseOutcome::Extracted,
        };
    }

    Validated {
        payload: degraded(raw, limits),
        outcome: ParseOutcome::Degraded,
    }
}

/// Merges a bad-output retry into the first result
///
/// Only fields that were bad in `first` are taken from `retry`.
pub fn merge_retry(first: Validated, retry: Validated) -> Validated {
    let Validated {
        payload: mut merged,
        outcome: first_outcome,
    } = first;
    let first_degraded = first_outcome == ParseOutcome::Degraded;
    let retry_degraded = retry.outcome == ParseOutcome::Degraded;
    let retry_outcome = retry.outcome;
    let retry_title_bad = retry.payload.title_is_bad();
    let retry = retry.payload;

    if merged.title_is_bad() && !retry_title_bad {
        merged.combination = retry.combination;
    }
    if merged.potential_indications.is_empty() && !retry.potential_indications.is_empty() {
        merged.potential_indications = retry.potential_indications;
    }
    if (merged.analysis.trim().is_empty() || (first_degraded && !retry_degraded))
        && !retry.analysis.trim().is_empty()
    {
        merged.analysis = retry.analysis;
    }
    if merged.recommendations.is_empty() {
        merged.recommendations = retry.recommendations;
    }

    let outcome = if first_degraded {
        retry_outcome
    } else {
        first_outcome
    };

    Validated {
        payload: merged,
        outcome,
    }
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn normalize(object: Map<String, Value>, limits: &PayloadLimits) -> CombinationPayload {
    let combination = string_field(&object, "combination");
    let combination = if combination.is_empty() {
        SENTINEL_TITLE.to_string()
    } else {
        combination
    };
    let analysis = string_field(&object, "analysis");

    let groups = match object.get("potential_indications") {
        Some(Value::Object(groups)) => groups,
        _ => &object,
    };
    let mut potential_indications = Indications::default();
    for name in Indications::GROUPS {
        if let Some(group) = potential_indications.group_mut(name) {
            *group = string_list(groups.get(name));
        }
    }

    let mut recommendations = string_list(object.get("recommendations"));
    recommendations.truncate(limits.max_recommendations);

    CombinationPayload {
        combination,
        analysis,
        potential_indications,
        recommendations,
    }
}

fn degraded(raw: &str, limits: &PayloadLimits) -> CombinationPayload {
    CombinationPayload {
        combination: SENTINEL_TITLE.to_string(),
        analysis: raw.trim().chars().take(limits.analysis_max_chars).collect(),
        potential_indications: Indications::default(),
        recommendations: Vec::new(),
    }
}

fn string_field(object: &Map<String, Value>, name: &str) -> String {
    match object.get(name) {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Coerces a JSON value into a clean list of strings
///
/// Array items are only trimmed. A single string is split into lines with
/// bullet markers removed.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(text)) => text
            .lines()
            .map(strip_bullet)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn strip_bullet(line: &str) -> &str {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', '•', '·', '–'])
        .trim_start();
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let rest = &line[digits..];
    let numbered = rest.starts_with(['.', ')'])
        && rest[1..].chars().next().map_or(true, char::is_whitespace);
    if digits > 0 && numbered {
        rest[1..].trim()
    } else {
        line.trim()
    }
}
