//! Core business logic for triadgen.
//!
//! # Modules
//!
//! - [`payload`] - Prompt building, output validation and bad-output merge
//! - [`throttle`] - Shared rate limiter and retry wrapper
//! - [`generation`] - Enumeration, worker pool, progress and summary
//!
//! # Generation Workflow
//!
//! 1. **Plan**: a single explicit triad, or every combination of the base set
//! 2. **Skip**: keys already in the store are not regenerated
//! 3. **Generate**: rate-limited, retried call to the generator
//! 4. **Validate**: tolerant parsing, degrading to a sentinel title
//! 5. **Retry bad output** (optional): one more call, merged field by field
//! 6. **Persist**: upsert by canonical key, or no-op in dry-run
//! 7. **Report**: periodic progress and a final summary
//!
//! # Example
//!
//! ```rust,no_run
//! use triadgen::config::load_config;
//! use triadgen::core::generation::{GenerationCoordinator, RunMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("triadgen.toml")?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = GenerationCoordinator::new(config, shutdown_rx).await?;
//! let summary = coordinator.execute(RunMode::EnumerateAll).await?;
//!
//! println!("Done: {}/{}", summary.done, summary.total);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod generation;
pub mod payload;
pub mod throttle;
