//! Text-generation collaborator trait

use crate::domain::Result;
use async_trait::async_trait;

/// Remote text generator
///
/// Output is opaque text with no structural guarantee.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generates text for a system prompt and a user prompt
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;
}
