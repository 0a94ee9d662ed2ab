use super::Transcriber;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

/// Whisper speech-to-text via whisper.cpp. The context is loaded once at
/// startup and shared; each call gets its own decoding state.
pub struct WhisperTranscriber {
    ctx: Arc<WhisperContext>,
    language_hint: Option<String>,
}

impl WhisperTranscriber {
    /// Loads a GGML Whisper model file (e.g. ggml-base.bin).
    pub fn new(model_path: &str, language_hint: Option<String>) -> Result<Self> {
        info!(model_path, "Loading Whisper model");
        let ctx = WhisperContext::new_with_params(model_path, WhisperContextParameters::default())
            .map_err(|e| {
                Error::transcription(format!("failed to load Whisper model '{model_path}': {e}"))
            })?;
        info!("Whisper model loaded");
        Ok(Self {
            ctx: Arc::new(ctx),
            language_hint,
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_16k_mono: Vec<f32>) -> Result<String> {
        let ctx = self.ctx.clone();
        let language = self.language_hint.clone();

        // whisper-rs is CPU-bound; run on the blocking thread pool
        let text = tokio::task::spawn_blocking(move || -> Result<String> {
            let mut state = ctx
                .create_state()
                .map_err(|e| Error::transcription(format!("failed to create state: {e}")))?;

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

            // None lets Whisper auto-detect the spoken language
            params.set_language(language.as_deref());

            // Suppress non-transcript output
            params.set_print_progress(false);
            params.set_print_special(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);

            state
                .full(params, &audio_16k_mono)
                .map_err(|e| Error::transcription(format!("transcription failed: {e}")))?;

            let n_segments = state.full_n_segments();

            let mut text = String::new();
            for i in 0..n_segments {
                if let Some(segment) = state.get_segment(i) {
                    if let Ok(seg_text) = segment.to_str() {
                        text.push_str(seg_text);
                    }
                }
            }

            let text = text.trim().to_string();
            debug!(text_len = text.len(), "Whisper transcription complete");
            Ok(text)
        })
        .await
        .map_err(|e| Error::transcription(format!("task join error: {e}")))??;

        Ok(text)
    }
}
