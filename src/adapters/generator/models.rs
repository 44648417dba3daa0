//! Ollama wire models

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// One response object, or one NDJSON line of a streamed response
#[derive(Debug, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}
