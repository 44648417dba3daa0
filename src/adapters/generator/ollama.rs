//! Ollama generator over HTTP

use super::models::{GenerateChunk, GenerateRequest};
use super::traits::Generator;
use crate::config::GeneratorConfig;
use crate::domain::{GeneratorError, Result, TriadError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Generator backed by an Ollama server's `/api/generate` endpoint
pub struct OllamaGenerator {
    client: Client,
    endpoint: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a new Ollama generator
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                TriadError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }
}

fn transport_error(e: reqwest::Error) -> GeneratorError {
    if e.is_timeout() {
        GeneratorError::Timeout(e.to_string())
    } else {
        GeneratorError::ConnectionFailed(e.to_string())
    }
}

/// Concatenates the `response` fields of a single object or NDJSON stream
///
/// Lines that don't parse are skipped.
fn collect_response(body: &str) -> std::result::Result<String, GeneratorError> {
    let chunks: Vec<GenerateChunk> = match serde_json::from_str::<GenerateChunk>(body) {
        Ok(chunk) => vec![chunk],
        Err(_) => body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect(),
    };

    if let Some(message) = chunks.iter().find_map(|chunk| chunk.error.as_deref()) {
        return Err(GeneratorError::InvalidResponse(message.to_string()));
    }

    let mut seen = false;
    let mut text = String::new();
    for piece in chunks.iter().filter_map(|chunk| chunk.response.as_deref()) {
        seen = true;
        text.push_str(piece);
    }

    if !seen {
        return Err(GeneratorError::InvalidResponse(
            "response body has no 'response' field".to_string(),
        ));
    }

    Ok(text.trim().to_string())
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.model,
            system,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if status.is_server_error() {
            return Err(GeneratorError::ServerError {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }
        if !status.is_success() {
            return Err(GeneratorError::ClientError {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        let text = collect_response(&body)?;
        tracing::debug!(model = %self.model, chars = text.len(), "Generation completed");
        Ok(text)
    }
}
