use super::{DiagnosisEngine, DiagnosisRequest};
use crate::{config::DemoConfig, Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

fn canned_response<'a>(config: &'a DemoConfig, language: &str) -> Result<&'a str> {
    config
        .responses
        .get(language)
        .map(String::as_str)
        .ok_or_else(|| {
            Error::config(format!(
                "no demo response configured for language '{language}'"
            ))
        })
}

/// Validates that the uploaded image decodes, as the real pipeline would.
/// A corrupt upload fails the request instead of returning a canned answer
/// for garbage input.
fn check_image(image: &[u8]) -> Result<()> {
    let image = image::load_from_memory(image)?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Image received"
    );
    Ok(())
}

/// Canned single-language engine: sleeps for the configured delay and
/// returns one fixed diagnosis.
pub struct DemoEngine {
    delay: Duration,
    diagnosis: String,
}

impl DemoEngine {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        let diagnosis = canned_response(config, &config.default_language)?.to_string();
        Ok(Self {
            delay: Duration::from_secs(config.delay_secs),
            diagnosis,
        })
    }
}

#[async_trait]
impl DiagnosisEngine for DemoEngine {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<String> {
        check_image(&request.image)?;

        info!(delay_secs = self.delay.as_secs(), "Simulating analysis");
        tokio::time::sleep(self.delay).await;

        Ok(self.diagnosis.clone())
    }
}

/// Canned engine that picks its response by the detected language of the
/// caller's prompt, so demos in front of non-English-speaking farmers answer
/// in their language.
pub struct MultilingualDemoEngine {
    delay: Duration,
    default_language: String,
    min_detect_chars: usize,
    responses: HashMap<String, String>,
}

impl MultilingualDemoEngine {
    pub fn new(config: &DemoConfig) -> Result<Self> {
        // Fail at startup, not mid-demo, if the fallback response is absent.
        canned_response(config, &config.default_language)?;
        Ok(Self {
            delay: Duration::from_secs(config.delay_secs),
            default_language: config.default_language.clone(),
            min_detect_chars: config.min_detect_chars,
            responses: config.responses.clone(),
        })
    }

    /// ISO 639-3 code of the prompt's dominant language, or the default when
    /// the prompt is too short to classify or detection fails.
    fn detect_language(&self, prompt: &str) -> &str {
        if prompt.chars().count() < self.min_detect_chars {
            debug!("Prompt too short for language detection, using default");
            return &self.default_language;
        }
        match whatlang::detect(prompt) {
            Some(info) => info.lang().code(),
            None => &self.default_language,
        }
    }

    fn select_response(&self, prompt: &str) -> &str {
        let language = self.detect_language(prompt);
        match self.responses.get(language) {
            Some(response) => {
                debug!(language, "Selected canned response");
                response
            }
            // Detected a language we have no translation for.
            None => &self.responses[&self.default_language],
        }
    }
}

#[async_trait]
impl DiagnosisEngine for MultilingualDemoEngine {
    async fn diagnose(&self, request: &DiagnosisRequest) -> Result<String> {
        check_image(&request.image)?;

        let diagnosis = self.select_response(&request.prompt).to_string();

        info!(delay_secs = self.delay.as_secs(), "Simulating analysis");
        tokio::time::sleep(self.delay).await;

        Ok(diagnosis)
    }
}
