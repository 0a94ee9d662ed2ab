use async_trait::async_trait;
use fieldscribe::{
    asr::Transcriber,
    vlm::{GenerateRequest, VisionLanguageModel},
    Error, Result,
};
use std::sync::{Arc, Mutex};

/// Mock transcriber returning a fixed transcript (or a fixed error).
pub struct MockTranscriber {
    pub transcript: String,
    pub error: Option<String>,
    pub received_samples: Arc<Mutex<Vec<usize>>>,
}

impl MockTranscriber {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            error: None,
            received_samples: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            transcript: String::new(),
            error: Some(error.into()),
            received_samples: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, audio_16k_mono: Vec<f32>) -> Result<String> {
        self.received_samples
            .lock()
            .unwrap()
            .push(audio_16k_mono.len());

        if let Some(ref error) = self.error {
            return Err(Error::transcription(error.clone()));
        }
        Ok(self.transcript.clone())
    }
}

/// Mock vision-language model returning fixed raw text and recording the
/// requests it receives.
pub struct MockVlm {
    pub raw_output: String,
    pub error: Option<String>,
    pub requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockVlm {
    pub fn new(raw_output: impl Into<String>) -> Self {
        Self {
            raw_output: raw_output.into(),
            error: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(error: impl Into<String>) -> Self {
        Self {
            raw_output: String::new(),
            error: Some(error.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn received_requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionLanguageModel for MockVlm {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::generation(error.clone()));
        }
        Ok(self.raw_output.clone())
    }
}
