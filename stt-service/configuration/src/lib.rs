use serde::{Deserialize, Serialize};

use shared::{
    load_config_fresh, ConfigError, ConfigLoader, HasLoggingConfig, HasServerConfig,
    LoggingConfig, ServerConfig,
};

pub use shared::setup_logging;

pub type AppConfig = SttConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub model: WhisperModelConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperModelConfig {
    #[serde(default = "default_model_name")]
    pub name: String,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default = "default_threads")]
    pub threads: usize,
    #[serde(default)]
    pub vad_model_path: Option<String>,
    #[serde(default)]
    pub background_load: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default = "default_task")]
    pub default_task: String,
    #[serde(default = "default_min_silence_duration_ms")]
    pub min_silence_duration_ms: u32,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl WhisperModelConfig {
    /// Explicit path, or `models/ggml-{name}.bin`.
    pub fn resolved_model_path(&self) -> String {
        match &self.model_path {
            Some(path) if !path.trim().is_empty() => path.clone(),
            _ => format!("models/ggml-{}.bin", self.name),
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            logging: LoggingConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Default for WhisperModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            model_path: None,
            device: default_device(),
            threads: default_threads(),
            vad_model_path: None,
            background_load: false,
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            default_task: default_task(),
            min_silence_duration_ms: default_min_silence_duration_ms(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ConfigLoader<SttConfig> for SttConfig {
    fn create_default() -> SttConfig {
        SttConfig::default()
    }

    fn config_prefix() -> &'static str {
        "STT_SERVICE"
    }

    fn legacy_env_overrides() -> &'static [(&'static str, &'static str)] {
        &[
            ("service.model.name", "WHISPER_MODEL"),
            ("service.model.device", "WHISPER_DEVICE"),
            ("service.model.model_path", "WHISPER_MODEL_PATH"),
            ("service.model.vad_model_path", "WHISPER_VAD_MODEL"),
            ("server.port", "WHISPER_PORT"),
        ]
    }
}

impl HasServerConfig for SttConfig {
    fn server_config(&self) -> &ServerConfig {
        &self.server
    }

    fn set_server_config(&mut self, config: ServerConfig) {
        self.server = config;
    }
}

impl HasLoggingConfig for SttConfig {
    fn logging_config(&self) -> &LoggingConfig {
        &self.logging
    }

    fn set_logging_config(&mut self, config: LoggingConfig) {
        self.logging = config;
    }
}

pub fn load_config() -> Result<SttConfig, ConfigError> {
    load_config_fresh::<SttConfig>()
}

fn default_server() -> ServerConfig {
    ServerConfig {
        port: 7861,
        ..ServerConfig::default()
    }
}

fn default_model_name() -> String {
    "medium".to_string()
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_threads() -> usize {
    4
}

fn default_language() -> String {
    "vi".to_string()
}

fn default_task() -> String {
    "transcribe".to_string()
}

fn default_min_silence_duration_ms() -> u32 {
    500
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shared::load_config_from;

    use super::*;

    #[test]
    fn config_defaults_are_deterministic() {
        let cfg = SttConfig::default();
        assert_eq!(cfg.server.port, 7861);
        assert_eq!(cfg.service.model.name, "medium");
        assert_eq!(cfg.service.model.device, "cuda");
        assert_eq!(cfg.service.transcription.default_language, "vi");
        assert_eq!(cfg.service.transcription.min_silence_duration_ms, 500);
        assert_eq!(cfg.service.model.resolved_model_path(), "models/ggml-medium.bin");
    }

    #[test]
    fn legacy_whisper_variables_are_honoured() {
        let env = HashMap::from([
            ("WHISPER_MODEL".to_string(), "large-v3".to_string()),
            ("WHISPER_DEVICE".to_string(), "cpu".to_string()),
            ("WHISPER_PORT".to_string(), "9000".to_string()),
        ]);
        let cfg = load_config_from::<SttConfig>("test", Some(env)).expect("config");
        assert_eq!(cfg.service.model.name, "large-v3");
        assert_eq!(cfg.service.model.device, "cpu");
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.service.model.resolved_model_path(), "models/ggml-large-v3.bin");
    }
}
