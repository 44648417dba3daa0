//! Status command implementation
//!
//! Reports how many combination records are stored and how many of them
//! are degraded.

use crate::adapters::database::create_backends;
use crate::config::load_config;
use crate::core::generation::combination_count;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking generation status");

        println!("📊 Generation Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let backends = match create_backends(&config).await {
            Ok(b) => b,
            Err(e) => {
                println!("❌ Failed to connect to database");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        if let Err(e) = backends.store.test_connection().await {
            println!("❌ Failed to connect to database");
            println!("   Error: {e}");
            return Ok(4);
        }

        let stats = match backends.store.stats().await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to read combination statistics");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        let base_count = if config.generation.base_codes.is_empty() {
            backends.profiles.list_codes().await.map(|codes| codes.len()).ok()
        } else {
            Some(config.generation.base_codes.len())
        };

        println!("  Stored combinations: {}", stats.total);
        println!("  Degraded records: {}", stats.degraded);
        if let Some(n) = base_count {
            let possible = combination_count(n);
            println!("  Base codes: {n}");
            println!("  Possible combinations: {possible}");
            println!("  Remaining: {}", possible.saturating_sub(stats.total));
        }
        println!();

        if stats.degraded > 0 {
            println!("Degraded records can be regenerated with 'triadgen generate --ids <codes> --force'.");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_status_with_memory_store() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"database_target = \"memory\"\n\n[generation]\nbase_codes = [30, 50, 76, 64]\n",
        )
        .unwrap();
        file.flush().unwrap();

        let code = StatusArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_status_missing_config() {
        let code = StatusArgs {}.execute("missing.toml").await.unwrap();
        assert_eq!(code, 2);
    }
}
