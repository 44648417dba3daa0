//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, TriadgenConfig};
use super::secret::secret_string;
use crate::domain::errors::TriadError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into TriadgenConfig
/// 4. Applies environment variable overrides (TRIADGEN_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is missing, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use triadgen::config::loader::load_config;
///
/// let config = load_config("triadgen.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TriadgenConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(TriadError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        TriadError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: TriadgenConfig = toml::from_str(&contents)
        .map_err(|e| TriadError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        TriadError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| TriadError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{var_name}}}"), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(TriadError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Reads and parses an override variable
///
/// Unset variables yield `Ok(None)`; unparseable values are an error.
fn env_override<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
            TriadError::Configuration(format!("Invalid value '{raw}' for {name}"))
        }),
        Err(_) => Ok(None),
    }
}

/// Applies environment variable overrides using TRIADGEN_* prefix
///
/// Environment variables follow the pattern: TRIADGEN_<SECTION>_<KEY>,
/// for example TRIADGEN_GENERATION_WORKERS or TRIADGEN_GENERATOR_MODEL.
fn apply_env_overrides(config: &mut TriadgenConfig) -> Result<()> {
    // Application overrides
    if let Some(val) = env_override("TRIADGEN_APPLICATION_LOG_LEVEL")? {
        config.application.log_level = val;
    }
    if let Some(val) = env_override("TRIADGEN_APPLICATION_DRY_RUN")? {
        config.application.dry_run = val;
    }

    // Generator overrides
    if let Some(val) = env_override("TRIADGEN_GENERATOR_BASE_URL")? {
        config.generator.base_url = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATOR_MODEL")? {
        config.generator.model = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATOR_TIMEOUT_SECONDS")? {
        config.generator.timeout_seconds = val;
    }

    // Generation overrides
    if let Some(val) = env_override("TRIADGEN_GENERATION_WORKERS")? {
        config.generation.workers = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATION_REQUESTS_PER_SECOND")? {
        config.generation.requests_per_second = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATION_MAX_RETRIES")? {
        config.generation.max_retries = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATION_LIMIT")? {
        config.generation.limit = Some(val);
    }
    if let Some(val) = env_override("TRIADGEN_GENERATION_RETRY_BAD")? {
        config.generation.retry_bad = val;
    }
    if let Some(val) = env_override("TRIADGEN_GENERATION_FORCE")? {
        config.generation.force = val;
    }

    // Database overrides
    if let Ok(val) = std::env::var("TRIADGEN_DATABASE_TARGET") {
        config.database_target = match val.trim().to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            _ => {
                return Err(TriadError::Configuration(format!(
                    "Invalid value '{val}' for TRIADGEN_DATABASE_TARGET"
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("TRIADGEN_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Some(val) = env_override("TRIADGEN_POSTGRESQL_MAX_CONNECTIONS")? {
            pg_config.max_connections = val;
        }
    }

    // Logging overrides
    if let Some(val) = env_override("TRIADGEN_LOGGING_LOCAL_ENABLED")? {
        config.logging.local_enabled = val;
    }
    if let Some(val) = env_override("TRIADGEN_LOGGING_LOCAL_PATH")? {
        config.logging.local_path = val;
    }

    Ok(())
}
