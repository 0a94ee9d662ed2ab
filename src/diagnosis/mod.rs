mod demo;
mod full;

pub use demo::{DemoEngine, MultilingualDemoEngine};
pub use full::FullEngine;

use crate::{
    config::{EngineConfig, EngineMode},
    vlm::OpenAiVlmClient,
    Error, Result,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Question used when the caller sends no `prompt` field.
pub const DEFAULT_PROMPT: &str = "Identify the disease on this plant leaf.";

/// One diagnosis request, already pulled out of the multipart form.
#[derive(Debug, Clone)]
pub struct DiagnosisRequest {
    pub image: Vec<u8>,
    pub audio: Vec<u8>,
    pub prompt: String,
}

/// A diagnosis backend. Requests are stateless and independent; engines
/// hold only immutable state loaded at startup.
#[async_trait]
pub trait DiagnosisEngine: Send + Sync {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<String>;
}

/// Builds the engine selected by configuration.
pub fn build_engine(config: &EngineConfig) -> Result<Arc<dyn DiagnosisEngine>> {
    match config.mode {
        EngineMode::Demo => Ok(Arc::new(DemoEngine::new(&config.demo)?)),
        EngineMode::DemoMultilingual => Ok(Arc::new(MultilingualDemoEngine::new(&config.demo)?)),
        EngineMode::Full => {
            let full = config
                .full
                .as_ref()
                .ok_or_else(|| Error::config("engine.full section required for full mode"))?;
            let transcriber = build_transcriber(full)?;
            let vlm = Arc::new(OpenAiVlmClient::new(&full.vlm));
            Ok(Arc::new(FullEngine::new(
                transcriber,
                vlm,
                full.image_max_dim,
            )))
        }
    }
}

#[cfg(feature = "local-whisper")]
fn build_transcriber(config: &crate::config::FullConfig) -> Result<Arc<dyn crate::asr::Transcriber>> {
    Ok(Arc::new(crate::asr::WhisperTranscriber::new(
        &config.whisper_model_path,
        config.language_hint.clone(),
    )?))
}

#[cfg(not(feature = "local-whisper"))]
fn build_transcriber(_config: &crate::config::FullConfig) -> Result<Arc<dyn crate::asr::Transcriber>> {
    Err(Error::config(
        "full mode requires the local-whisper feature; rebuild with --features local-whisper",
    ))
}

/// Builds the text prompt handed to the vision-language model. The leading
/// `<image>` token is the model's image placeholder.
pub fn compose_prompt(question: &str, transcript: &str) -> String {
    format!(
        "<image> {question}\n\
         The following notes are from a farmer and may be in their local language \
         (e.g., Malayalam, English).\n\
         Farmer's spoken notes: {transcript}"
    )
}

/// Strips the echoed prompt from raw generated text.
///
/// Models that echo their input repeat the transcript verbatim before the
/// answer, so everything after its first occurrence is the diagnosis. If the
/// transcript does not occur (multilingual transcripts are often re-spelled
/// by the model) the full text is returned rather than slicing at a bogus
/// offset.
pub fn strip_prompt_echo(raw: &str, transcript: &str) -> String {
    if transcript.trim().is_empty() {
        return raw.trim().to_string();
    }
    match raw.find(transcript) {
        Some(idx) => raw[idx + transcript.len()..].trim().to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_embeds_question_and_transcript() {
        let prompt = compose_prompt(
            "What is wrong with this leaf?",
            "The leaves have dark brown spots.",
        );

        assert!(prompt.starts_with("<image> What is wrong with this leaf?"));
        assert!(prompt.ends_with("Farmer's spoken notes: The leaves have dark brown spots."));
    }

    #[test]
    fn echo_stripping_returns_text_after_transcript() {
        let transcript = "the leaves have spots";
        let raw = format!("<image> question\nnotes: {transcript}  leaf spot, apply fungicide.\n");

        assert_eq!(
            strip_prompt_echo(&raw, transcript),
            "leaf spot, apply fungicide."
        );
    }

    #[test]
    fn echo_stripping_uses_first_occurrence() {
        let raw = "marker answer marker tail";

        assert_eq!(strip_prompt_echo(raw, "marker"), "answer marker tail");
    }

    #[test]
    fn echo_stripping_falls_back_to_full_text_when_marker_missing() {
        let raw = "  a diagnosis with no echoed prompt  ";

        assert_eq!(
            strip_prompt_echo(raw, "transcript that was re-spelled"),
            "a diagnosis with no echoed prompt"
        );
    }

    #[test]
    fn echo_stripping_treats_blank_transcript_as_missing() {
        assert_eq!(strip_prompt_echo(" full text ", "   "), "full text");
        assert_eq!(strip_prompt_echo(" full text ", ""), "full text");
    }
}
