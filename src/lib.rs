// Triadgen - Physiology triad combination generator
// Copyright (c) 2025 Triadgen Contributors
// Licensed under the MIT License

//! # Triadgen - physiology triad combination generator
//!
//! Triadgen generates a profile for every unordered triad of physiology
//! codes by prompting a local text generator, repairing its output and
//! upserting the result under a canonical key.
//!
//! ## Overview
//!
//! - **Canonicalizing** triads so the same three codes always map to one key
//! - **Generating** profiles through a shared rate limiter and retry wrapper
//! - **Validating** free-form output, degrading to a sentinel title instead
//!   of failing
//! - **Persisting** idempotently, so reruns skip completed keys
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline (payload, throttle, generation)
//! - [`adapters`] - PostgreSQL, Ollama and in-memory collaborators
//! - [`domain`] - Codes, keys, records and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use triadgen::config::load_config;
//! use triadgen::core::generation::{GenerationCoordinator, RunMode};
//! use triadgen::domain::Triad;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("triadgen.toml")?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = GenerationCoordinator::new(config, shutdown_rx).await?;
//!     let triad = Triad::parse("30,50,76")?;
//!     let summary = coordinator.execute(RunMode::Explicit(triad)).await?;
//!
//!     println!("Persisted {} record(s)", summary.persisted);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::TriadError`]. Only a failure to determine the base code set
//! aborts a run; per-triad failures are counted in the summary.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
