//! External system integrations for triadgen.
//!
//! - [`database`] - Collaborator traits and backend factory
//! - [`postgresql`] - PostgreSQL profiles and combination store
//! - [`generator`] - Text generation (Ollama)
//! - [`memory`] - In-memory collaborators
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the pipeline can
//! be driven by stub generators and in-memory stores in tests.
//!
//! ```rust,no_run
//! use triadgen::adapters::database::create_backends;
//! use triadgen::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("triadgen.toml")?;
//! let backends = create_backends(&config).await?;
//! backends.store.test_connection().await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod generator;
pub mod memory;
pub mod postgresql;
