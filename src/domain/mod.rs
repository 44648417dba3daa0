//! Domain models and types for triadgen.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Codes and identity** ([`PhysiologyCode`], [`Triad`], [`CanonicalKey`])
//! - **Persisted artifact** ([`CombinationRecord`], [`Indications`])
//! - **Error types** ([`TriadError`], [`GeneratorError`])
//! - **Result type alias** ([`Result`])
//!
//! # Canonical identity
//!
//! The order in which callers supply codes never affects identity:
//!
//! ```rust
//! use triadgen::domain::Triad;
//!
//! # fn example() -> triadgen::domain::Result<()> {
//! let a = Triad::normalize(&[30.0, 76.0, 50.0])?;
//! let b = Triad::normalize(&[76.0, 30.0, 50.0])?;
//! assert_eq!(a.canonical_key(), b.canonical_key());
//! assert_eq!(a.canonical_key().as_str(), "30.00,50.00,76.00");
//! # Ok(())
//! # }
//! ```

pub mod codes;
pub mod errors;
pub mod record;
pub mod result;

pub use codes::{CanonicalKey, PhysiologyCode, Triad};
pub use errors::{GeneratorError, TriadError};
pub use record::{is_degraded_content, CombinationRecord, Indications, SENTINEL_TITLE};
pub use result::Result;
