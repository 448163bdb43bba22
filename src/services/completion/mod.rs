//! Completion service seam.
//!
//! Plan and detail generation both go through [`CompletionClient`], so tests
//! can script responses without touching the network.

use async_trait::async_trait;

mod error;
mod gemini;

pub use error::GenerationError;
pub use gemini::GeminiClient;

use crate::models::schema::Schema;

/// A single schema-constrained generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub schema: Schema,
    pub temperature: f32,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the raw JSON text produced by the service.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
