use super::{GenerateRequest, VisionLanguageModel};
use crate::{config::VlmConfig, Error, Result};
use async_openai::{config::OpenAIConfig, types as openai_types, Client};
use async_trait::async_trait;
use base64::Engine;
use tracing::debug;

/// Vision-language model served behind an OpenAI-compatible
/// chat-completions endpoint (llama.cpp server, vLLM, ...). The image goes
/// over the wire as a base64 `data:` URL content part.
pub struct OpenAiVlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_new_tokens: u32,
}

impl OpenAiVlmClient {
    pub fn new(config: &VlmConfig) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.clone());
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            max_new_tokens: config.max_new_tokens,
        }
    }
}

#[async_trait]
impl VisionLanguageModel for OpenAiVlmClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&request.image_png);
        let data_url = format!("data:image/png;base64,{b64}");

        debug!(
            prompt_len = request.prompt.len(),
            image_bytes = request.image_png.len(),
            "Sending generation request"
        );

        let parts: Vec<openai_types::ChatCompletionRequestUserMessageContentPart> = vec![
            openai_types::ChatCompletionRequestMessageContentPartTextArgs::default()
                .text(request.prompt)
                .build()?
                .into(),
            openai_types::ChatCompletionRequestMessageContentPartImageArgs::default()
                .image_url(openai_types::ImageUrlArgs::default().url(data_url).build()?)
                .build()?
                .into(),
        ];

        let message = openai_types::ChatCompletionRequestUserMessageArgs::default()
            .content(parts)
            .build()?;

        let openai_request = openai_types::CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .max_tokens(self.max_new_tokens)
            .build()?;

        let response = self.client.chat().create(openai_request).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::generation("model returned no choices"))?;

        debug!(text_len = text.len(), "Generation complete");
        Ok(text)
    }
}
