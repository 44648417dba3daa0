//! Physiology codes, triads and canonical keys
//!
//! Codes live in a fixed two-decimal domain (`30.00`..`76.00` for the official
//! set). They are stored as integer hundredths so ordering, hashing and
//! formatting are exact.

use super::errors::TriadError;
use super::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest value representable by a `NUMERIC(5,2)` column, in hundredths
const MAX_HUNDREDTHS: u32 = 99_999;

/// Physiology code newtype wrapper
///
/// # Examples
///
/// ```
/// use triadgen::domain::PhysiologyCode;
/// use std::str::FromStr;
///
/// let code = PhysiologyCode::from_str("30").unwrap();
/// assert_eq!(code.to_string(), "30.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct PhysiologyCode(u32);

impl PhysiologyCode {
    /// Creates a code from a numeric value, rounding to two decimals
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(TriadError::InvalidTriad(format!(
                "physiology code must be a finite, non-negative number, got {value}"
            )));
        }
        let hundredths = (value * 100.0).round();
        if hundredths > f64::from(MAX_HUNDREDTHS) {
            return Err(TriadError::InvalidTriad(format!(
                "physiology code {value} exceeds the two-decimal domain"
            )));
        }
        Ok(Self(hundredths as u32))
    }

    /// Returns the value as a float
    pub fn as_f64(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Returns the integer program code (`30.00` -> `30`)
    pub fn program_code(&self) -> i32 {
        (self.0 / 100) as i32
    }

    /// Human-readable label for the official physiologies
    pub fn label(&self) -> Option<&'static str> {
        PHYSIOLOGY_LABELS
            .iter()
            .find(|(hundredths, _)| *hundredths == self.0)
            .map(|(_, label)| *label)
    }
}

impl fmt::Display for PhysiologyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for PhysiologyCode {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim().parse().map_err(|_| {
            TriadError::InvalidTriad(format!("'{}' is not a numeric physiology code", s.trim()))
        })?;
        Self::new(value)
    }
}

impl TryFrom<f64> for PhysiologyCode {
    type Error = TriadError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PhysiologyCode> for f64 {
    fn from(code: PhysiologyCode) -> Self {
        code.as_f64()
    }
}

const PHYSIOLOGY_LABELS: [(u32, &str); 22] = [
    (3000, "Cells & tissue"),
    (3200, "Blood"),
    (3400, "Immune system"),
    (3600, "Lymphatic system"),
    (3800, "Circulatory system"),
    (4000, "Heart"),
    (4200, "Respiratory system"),
    (4400, "Kidney / urinary"),
    (4600, "Digestive system"),
    (4800, "Liver-gall-pancreas"),
    (5000, "Metabolism"),
    (5200, "Musculoskeletal"),
    (5400, "Nervous system"),
    (5600, "Vision"),
    (5800, "Acoustic / equilibrium"),
    (6200, "Skin / hair"),
    (6400, "Hormonal system"),
    (6600, "Female sexual organs"),
    (6800, "Male sexual organs"),
    (7200, "Psyche"),
    (7500, "Stress"),
    (7600, "Teeth (overall)"),
];

/// Canonical identity of a triad
///
/// Members sorted ascending, each formatted to two decimals, joined by commas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unordered set of three physiology codes, held in ascending order
///
/// Repeated codes are accepted; see [`Triad::has_duplicates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triad([PhysiologyCode; 3]);

impl Triad {
    /// Builds a triad from three codes in any order
    pub fn new(codes: [PhysiologyCode; 3]) -> Self {
        let mut codes = codes;
        codes.sort_unstable();
        Self(codes)
    }

    /// Normalizes caller-supplied numeric codes into a triad
    ///
    /// # Errors
    ///
    /// Returns [`TriadError::InvalidTriad`] unless exactly three valid codes
    /// are supplied.
    pub fn normalize(values: &[f64]) -> Result<Self> {
        if values.len() != 3 {
            return Err(TriadError::InvalidTriad(format!(
                "expected exactly 3 codes, got {}",
                values.len()
            )));
        }
        let codes = [
            PhysiologyCode::new(values[0])?,
            PhysiologyCode::new(values[1])?,
            PhysiologyCode::new(values[2])?,
        ];
        Ok(Self::new(codes))
    }

    /// Parses a comma-separated list such as `"30,50,76"`
    pub fn parse(input: &str) -> Result<Self> {
        let values = input
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    TriadError::InvalidTriad(format!(
                        "'{}' is not a numeric physiology code",
                        part.trim()
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::normalize(&values)
    }

    /// Members in ascending order
    pub fn codes(&self) -> &[PhysiologyCode; 3] {
        &self.0
    }

    /// Derives the permutation-invariant key
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey(
            self.0
                .iter()
                .map(PhysiologyCode::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Whether any code appears more than once
    pub fn has_duplicates(&self) -> bool {
        self.0[0] == self.0[1] || self.0[1] == self.0[2]
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}

impl FromStr for Triad {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
