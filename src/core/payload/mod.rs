//! Prompt building and generator output handling
//!
//! - [`prompt`] - System prompt and per-triad context
//! - [`validator`] - Tolerant parsing, normalization and bad-output merge

pub mod prompt;
pub mod validator;

pub use prompt::{build_context, build_user_prompt, SYSTEM_PROMPT};
pub use validator::{
    merge_retry, validate, CombinationPayload, ParseOutcome, PayloadLimits, Validated,
};
