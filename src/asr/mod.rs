#[cfg(feature = "local-whisper")]
mod whisper;

#[cfg(feature = "local-whisper")]
pub use whisper::WhisperTranscriber;

use crate::Result;
use async_trait::async_trait;

/// Speech-to-text over PCM audio at 16kHz mono, f32 normalized [-1.0, 1.0].
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_16k_mono: Vec<f32>) -> Result<String>;
}
