mod client;

pub use client::OpenAiVlmClient;

use crate::Result;
use async_trait::async_trait;

/// One generation call: an image plus the full text prompt.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// PNG-encoded image, already resized.
    pub image_png: Vec<u8>,
    pub prompt: String,
}

/// Vision-language generation backend. Returns the raw generated text; the
/// caller handles any echoed-prompt cleanup.
#[async_trait]
pub trait VisionLanguageModel: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}
