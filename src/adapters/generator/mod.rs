//! Text-generation integration
//!
//! - [`traits`] - The [`Generator`] collaborator trait
//! - [`ollama`] - Ollama `/api/generate` client

pub mod models;
pub mod ollama;
pub mod traits;

pub use ollama::OllamaGenerator;
pub use traits::Generator;
