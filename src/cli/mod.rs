//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for triadgen using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Triadgen - physiology triad combination generator
#[derive(Parser, Debug)]
#[command(name = "triadgen")]
#[command(version, about, long_about = None)]
#[command(author = "Triadgen Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "triadgen.toml", env = "TRIADGEN_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRIADGEN_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate combination profiles for one triad or the whole base set
    Generate(commands::generate::GenerateArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show stored combination counts
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
