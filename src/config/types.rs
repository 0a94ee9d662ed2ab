use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub mode: EngineMode,
    #[serde(default)]
    pub demo: DemoConfig,
    #[serde(default)]
    pub full: Option<FullConfig>,
}

/// Which diagnosis engine serves requests. The demo modes fabricate output
/// (with simulated latency) and exist for reliable demonstrations on
/// hardware that cannot run the models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    Demo,
    DemoMultilingual,
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Simulated inference latency in seconds.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    /// ISO 639-3 code used when detection is skipped, fails, or the
    /// detected language has no canned response.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Prompts shorter than this (in chars) skip language detection.
    #[serde(default = "default_min_detect_chars")]
    pub min_detect_chars: usize,
    /// ISO 639-3 language code -> pre-translated diagnosis string.
    #[serde(default = "default_responses")]
    pub responses: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullConfig {
    /// Path to a GGML Whisper model file (e.g. ggml-base.bin).
    pub whisper_model_path: String,
    /// Optional ISO 639-1 language hint passed to Whisper.
    #[serde(default)]
    pub language_hint: Option<String>,
    /// Longest image dimension after resizing, to bound peak memory.
    #[serde(default = "default_image_max_dim")]
    pub image_max_dim: u32,
    pub vlm: VlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            default_language: default_language(),
            min_detect_chars: default_min_detect_chars(),
            responses: default_responses(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_delay_secs() -> u64 {
    5
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_min_detect_chars() -> usize {
    20
}

fn default_responses() -> HashMap<String, String> {
    HashMap::from([
        (
            "eng".to_string(),
            "leaf spot, likely caused by a fungal infection. Recommend isolating \
             the plant and applying a copper fungicide."
                .to_string(),
        ),
        (
            "mal".to_string(),
            "ഇലപ്പുള്ളി രോഗം, ഒരു കുമിൾ അണുബാധ മൂലമാകാം. ചെടിയെ മാറ്റിനിർത്തി \
             കോപ്പർ കുമിൾനാശിനി പ്രയോഗിക്കാൻ ശുപാർശ ചെയ്യുന്നു."
                .to_string(),
        ),
    ])
}

fn default_image_max_dim() -> u32 {
    256
}

fn default_max_new_tokens() -> u32 {
    128
}
