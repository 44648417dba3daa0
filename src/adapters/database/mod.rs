//! Collaborator abstraction layer
//!
//! Trait definitions for base-profile lookup and combination storage, plus
//! the factory that builds the configured backends.

pub mod factory;
pub mod traits;

pub use factory::{create_backends, create_generator, Backends};
pub use traits::{CombinationStore, ProfileSource, StoreStats};
