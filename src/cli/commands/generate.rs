//! Generate command implementation

use crate::config::{load_config, TriadgenConfig};
use crate::core::generation::{combination_count, GenerationCoordinator, RunMode};
use crate::domain::{Result, Triad, TriadError};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the generate command
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Exactly three physiology codes, comma-separated (e.g. 30,50,76)
    #[arg(long, value_name = "CODES", required_unless_present = "all", conflicts_with = "all")]
    pub ids: Option<String>,

    /// Generate every combination of the base code set
    #[arg(long)]
    pub all: bool,

    /// Override the number of concurrent workers
    #[arg(long)]
    pub workers: Option<usize>,

    /// Override the generator request rate (requests per second)
    #[arg(long)]
    pub rps: Option<f64>,

    /// Stop after this many triads (with --all)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Generate and validate without writing to the store
    #[arg(long)]
    pub dry_run: bool,

    /// Retry once when the generator output is degraded
    #[arg(long)]
    pub retry_bad: bool,

    /// Regenerate triads that already exist
    #[arg(long)]
    pub force: bool,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting generate command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let mode = match self.run_mode() {
            Ok(mode) => mode,
            Err(e) => {
                eprintln!("Invalid --ids: {e}");
                return Ok(2);
            }
        };

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - no records will be written");
            println!("🔍 DRY RUN MODE - No records will be written to the database");
            println!();
        }

        if mode == RunMode::EnumerateAll
            && !self.yes
            && !config.application.dry_run
            && !confirm(&config)?
        {
            println!("Generation cancelled.");
            return Ok(0);
        }

        let coordinator = match GenerationCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create generation coordinator");
                eprintln!("Failed to initialize generation: {e}");
                return Ok(init_failure_exit_code(&e));
            }
        };

        println!("🚀 Starting generation...");
        println!();

        let summary = match coordinator.execute(mode).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Generation failed");
                eprintln!("Generation failed: {e}");
                return Ok(5);
            }
        };

        println!();
        println!("📊 Generation Summary:");
        println!("  Total: {}", summary.total);
        println!("  Done: {}", summary.done);
        println!("  Skipped (existing): {}", summary.skipped);
        println!("  Persisted: {}", summary.persisted);
        println!("  Degraded: {}", summary.bad);
        println!("  Failed: {}", summary.failed);
        println!("  Duration: {:.2}s", summary.elapsed.as_secs_f64());
        println!("  Success Rate: {:.2}%", summary.success_rate());
        println!();

        let exit_code = if summary.interrupted {
            println!("⚠️  Generation interrupted. Completed records were saved.");
            println!("   Run the same command again to generate the remaining triads.");
            130
        } else if summary.is_successful() {
            println!("✅ Generation completed successfully!");
            0
        } else {
            println!("⚠️  Generation completed with failures");
            1
        };

        Ok(exit_code)
    }

    fn apply_overrides(&self, config: &mut TriadgenConfig) {
        if let Some(workers) = self.workers {
            tracing::info!(workers, "Overriding workers from CLI");
            config.generation.workers = workers;
        }
        if let Some(rps) = self.rps {
            tracing::info!(rps, "Overriding request rate from CLI");
            config.generation.requests_per_second = rps;
        }
        if let Some(limit) = self.limit {
            if self.all {
                config.generation.limit = Some(limit);
            } else {
                tracing::warn!("--limit only applies with --all, ignoring");
            }
        }
        if self.dry_run {
            config.application.dry_run = true;
        }
        if self.retry_bad {
            config.generation.retry_bad = true;
        }
        if self.force {
            config.generation.force = true;
        }
    }

    fn run_mode(&self) -> Result<RunMode> {
        match &self.ids {
            Some(ids) => {
                let triad = Triad::parse(ids)?;
                if triad.has_duplicates() {
                    tracing::warn!(key = %triad.canonical_key(), "Triad contains a repeated code");
                    eprintln!("Warning: triad {triad} contains a repeated code");
                }
                Ok(RunMode::Explicit(triad))
            }
            None => Ok(RunMode::EnumerateAll),
        }
    }
}

fn confirm(config: &TriadgenConfig) -> anyhow::Result<bool> {
    use std::io::{self, Write};

    let generation = &config.generation;
    println!("Generation Configuration:");
    if generation.base_codes.is_empty() {
        println!("  Base codes: from profile source");
    } else {
        println!(
            "  Base codes: {} ({} combinations)",
            generation.base_codes.len(),
            combination_count(generation.base_codes.len())
        );
    }
    match generation.limit {
        Some(limit) => println!("  Limit: {limit}"),
        None => println!("  Limit: none"),
    }
    println!("  Workers: {}", generation.workers);
    println!("  Requests/second: {}", generation.requests_per_second);
    println!("  Model: {}", config.generator.model);
    println!("  Retry bad output: {}", generation.retry_bad);
    println!("  Force regeneration: {}", generation.force);
    println!();
    print!("Proceed with generation? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Exit code for a coordinator that could not be built
///
/// Configuration problems exit with 2, everything else is a connection error.
fn init_failure_exit_code(error: &TriadError) -> i32 {
    match error {
        TriadError::Configuration(_) => 2,
        _ => 4,
    }
}
