//! Validate config command implementation

use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Generator: {}", config.generator.base_url);
        println!("  Model: {}", config.generator.model);

        match config.database_target {
            DatabaseTarget::PostgreSQL => {
                if let Some(ref pg_config) = config.postgresql {
                    use secrecy::ExposeSecret;
                    println!("  Database Target: PostgreSQL");
                    println!(
                        "  PostgreSQL Host: {}",
                        pg_config
                            .connection_string
                            .expose_secret()
                            .as_ref()
                            .rsplit('@')
                            .next()
                            .unwrap_or("***")
                    );
                    println!("  Max Connections: {}", pg_config.max_connections);
                }
            }
            DatabaseTarget::Memory => {
                println!("  Database Target: in-memory (nothing is kept after the run)");
            }
        }

        let generation = &config.generation;
        println!("  Workers: {}", generation.workers);
        println!("  Requests/second: {}", generation.requests_per_second);
        println!("  Max Retries: {}", generation.max_retries);
        if generation.base_codes.is_empty() {
            println!("  Base Codes: from profile source");
        } else {
            println!("  Base Codes: {:?}", generation.base_codes);
        }
        println!();
        Ok(0)
    }
}
