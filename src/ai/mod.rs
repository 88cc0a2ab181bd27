//! AI service integration for text and image generation
//!
//! Provides the Gemini clients used to plan a stock image (intention, English
//! prompt, keywords) and to render the image itself, plus test doubles.

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod structured;

pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockFailure, MockImageClient, MockTextClient};
pub use structured::StructuredOutput;

use crate::models::{GenerationRequest, TextResult};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Plan the image: intention, English prompt and keywords.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<TextResult>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Render `prompt` and return the image as a `data:` URI.
    async fn generate_image(&self, prompt: &str) -> Result<String>;
}
