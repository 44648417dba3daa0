//! Configuration management for triadgen.
//!
//! TOML configuration with `${VAR_NAME}` substitution, `TRIADGEN_*`
//! environment overrides, defaults for every optional setting, and
//! validation on load.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use triadgen::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("triadgen.toml")?;
//!
//! println!("Generator: {} ({})", config.generator.base_url, config.generator.model);
//! println!("Workers: {}", config.generation.workers);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`GeneratorConfig`] - Ollama endpoint, model and timeout
//! - [`GenerationConfig`] - Workers, rate, retries, limits
//! - [`PostgreSQLConfig`] - Connection pool for profiles and records
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! database_target = "postgresql"
//!
//! [application]
//! log_level = "info"
//!
//! [generator]
//! base_url = "http://localhost:11434"
//! model = "llama3.1:8b"
//!
//! [generation]
//! workers = 6
//! requests_per_second = 2.0
//! max_retries = 3
//!
//! [postgresql]
//! connection_string = "${TRIADGEN_DATABASE_URL}"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DatabaseTarget, GenerationConfig, GeneratorConfig, LoggingConfig,
    PostgreSQLConfig, TriadgenConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
