//! PostgreSQL database integration
//!
//! Reads base profiles from the RAH reference tables and stores combination
//! records keyed by canonical key.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLCombination;
