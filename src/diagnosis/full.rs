use super::{compose_prompt, strip_prompt_echo, DiagnosisEngine, DiagnosisRequest};
use crate::{
    asr::Transcriber,
    audio,
    vlm::{GenerateRequest, VisionLanguageModel},
    Error, Result,
};
use async_trait::async_trait;
use image::ImageOutputFormat;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};

/// Real inference pipeline: transcribe the audio, resize the image, and ask
/// the vision-language model.
pub struct FullEngine {
    transcriber: Arc<dyn Transcriber>,
    vlm: Arc<dyn VisionLanguageModel>,
    image_max_dim: u32,
}

impl FullEngine {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        vlm: Arc<dyn VisionLanguageModel>,
        image_max_dim: u32,
    ) -> Self {
        Self {
            transcriber,
            vlm,
            image_max_dim,
        }
    }

    /// Decodes the upload and bounds its longest dimension, re-encoding as
    /// PNG for the model client. Large phone photos dominate peak memory
    /// otherwise.
    fn prepare_image(image_bytes: &[u8], max_dim: u32) -> Result<Vec<u8>> {
        let image = image::load_from_memory(image_bytes)?;
        let resized = image.thumbnail(max_dim, max_dim);
        debug!(
            width = resized.width(),
            height = resized.height(),
            "Image resized for analysis"
        );

        let mut png = Vec::new();
        resized.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
        Ok(png)
    }
}

#[async_trait]
impl DiagnosisEngine for FullEngine {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<String> {
        // Audio decode is CPU-bound; keep it off the request thread.
        let audio_bytes = request.audio.clone();
        let samples = tokio::task::spawn_blocking(move || audio::decode_to_mono_16k(&audio_bytes))
            .await
            .map_err(|e| Error::internal(format!("audio decode task failed: {e}")))??;

        let transcript = self.transcriber.transcribe(samples).await?;
        info!(transcript_len = transcript.len(), "Transcription complete");

        let image_bytes = request.image.clone();
        let max_dim = self.image_max_dim;
        let image_png =
            tokio::task::spawn_blocking(move || Self::prepare_image(&image_bytes, max_dim))
                .await
                .map_err(|e| Error::internal(format!("image task failed: {e}")))??;

        let prompt = compose_prompt(&request.prompt, &transcript);
        let raw = self
            .vlm
            .generate(GenerateRequest { image_png, prompt })
            .await?;

        let diagnosis = strip_prompt_echo(&raw, &transcript);
        info!(diagnosis_len = diagnosis.len(), "Diagnosis complete");
        Ok(diagnosis)
    }
}
