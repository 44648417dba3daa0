//! Domain error types
//!
//! This module defines the error hierarchy for triadgen.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main triadgen error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum TriadError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A triad could not be formed from the supplied codes
    #[error("Invalid triad: {0}")]
    InvalidTriad(String),

    /// Text-generation service errors
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Base-profile lookup errors
    #[error("Profile lookup error: {0}")]
    Profile(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Text-generation service errors
///
/// Errors that occur when calling the remote generator.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Failed to reach the generator
    #[error("Failed to connect to generator: {0}")]
    ConnectionFailed(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response from generator: {0}")]
    InvalidResponse(String),

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl From<std::io::Error> for TriadError {
    fn from(err: std::io::Error) -> Self {
        TriadError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TriadError {
    fn from(err: serde_json::Error) -> Self {
        TriadError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TriadError {
    fn from(err: toml::de::Error) -> Self {
        TriadError::Configuration(format!("TOML parse error: {err}"))
    }
}
