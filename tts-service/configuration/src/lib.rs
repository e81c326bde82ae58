use serde::{Deserialize, Serialize};

use shared::{
    load_config_fresh, ConfigError, ConfigLoader, HasLoggingConfig, HasServerConfig,
    LoggingConfig, ServerConfig,
};

pub use shared::setup_logging;

pub type AppConfig = TtsConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
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
    pub model: TtsModelConfig,
    #[serde(default)]
    pub voices: VoicesConfig,
    #[serde(default)]
    pub synthesis: SynthesisConfig,
}

/// How to reach and load the acoustic model runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsModelConfig {
    #[serde(default = "default_backbone_repo")]
    pub backbone_repo: String,
    #[serde(default = "default_device")]
    pub backbone_device: String,
    #[serde(default = "default_codec_repo")]
    pub codec_repo: String,
    #[serde(default = "default_device")]
    pub codec_device: String,
    #[serde(default = "default_memory_util")]
    pub memory_util: f32,
    #[serde(default = "default_runtime_url")]
    pub runtime_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,
    #[serde(default = "default_readiness_delay_ms")]
    pub readiness_delay_ms: u64,
    #[serde(default)]
    pub background_load: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicesConfig {
    #[serde(default = "default_voices_dir")]
    pub voices_dir: String,
    #[serde(default = "default_voice")]
    pub default_voice: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            logging: LoggingConfig::default(),
            service: ServiceConfig::default(),
        }
    }
}

impl Default for TtsModelConfig {
    fn default() -> Self {
        Self {
            backbone_repo: default_backbone_repo(),
            backbone_device: default_device(),
            codec_repo: default_codec_repo(),
            codec_device: default_device(),
            memory_util: default_memory_util(),
            runtime_url: default_runtime_url(),
            request_timeout_secs: default_request_timeout_secs(),
            readiness_attempts: default_readiness_attempts(),
            readiness_delay_ms: default_readiness_delay_ms(),
            background_load: false,
        }
    }
}

impl Default for VoicesConfig {
    fn default() -> Self {
        Self {
            voices_dir: default_voices_dir(),
            default_voice: default_voice(),
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ConfigLoader<TtsConfig> for TtsConfig {
    fn create_default() -> TtsConfig {
        TtsConfig::default()
    }

    fn config_prefix() -> &'static str {
        "TTS_SERVICE"
    }

    fn legacy_env_overrides() -> &'static [(&'static str, &'static str)] {
        &[
            ("service.model.backbone_repo", "BACKBONE_REPO"),
            ("service.model.codec_repo", "CODEC_REPO"),
            ("service.model.backbone_device", "BACKBONE_DEVICE"),
            ("service.model.codec_device", "CODEC_DEVICE"),
            ("service.model.runtime_url", "TTS_RUNTIME_URL"),
            ("service.voices.default_voice", "DEFAULT_VOICE"),
            ("service.voices.voices_dir", "VOICES_DIR"),
            ("server.host", "API_HOST"),
            ("server.port", "API_PORT"),
        ]
    }
}

impl HasServerConfig for TtsConfig {
    fn server_config(&self) -> &ServerConfig {
        &self.server
    }

    fn set_server_config(&mut self, config: ServerConfig) {
        self.server = config;
    }
}

impl HasLoggingConfig for TtsConfig {
    fn logging_config(&self) -> &LoggingConfig {
        &self.logging
    }

    fn set_logging_config(&mut self, config: LoggingConfig) {
        self.logging = config;
    }
}

pub fn load_config() -> Result<TtsConfig, ConfigError> {
    load_config_fresh::<TtsConfig>()
}

fn default_server() -> ServerConfig {
    ServerConfig {
        port: 8000,
        ..ServerConfig::default()
    }
}

fn default_backbone_repo() -> String {
    "pnnbao-ump/VieNeu-TTS".to_string()
}

fn default_codec_repo() -> String {
    "neuphonic/distill-neucodec".to_string()
}

fn default_device() -> String {
    "cuda".to_string()
}

fn default_memory_util() -> f32 {
    0.4
}

fn default_runtime_url() -> String {
    "http://127.0.0.1:8001".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_readiness_attempts() -> u32 {
    60
}

fn default_readiness_delay_ms() -> u64 {
    1000
}

fn default_voices_dir() -> String {
    "voices".to_string()
}

fn default_voice() -> String {
    "Doan".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shared::load_config_from;

    use super::*;

    #[test]
    fn config_defaults_match_deployment() {
        let cfg = TtsConfig::default();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.service.model.backbone_repo, "pnnbao-ump/VieNeu-TTS");
        assert_eq!(cfg.service.model.codec_repo, "neuphonic/distill-neucodec");
        assert_eq!(cfg.service.model.memory_util, 0.4);
        assert_eq!(cfg.service.voices.default_voice, "Doan");
        assert_eq!(cfg.service.synthesis.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn legacy_variables_are_honoured() {
        let env = HashMap::from([
            ("BACKBONE_DEVICE".to_string(), "cpu".to_string()),
            ("DEFAULT_VOICE".to_string(), "Vinh".to_string()),
            ("API_PORT".to_string(), "9100".to_string()),
            ("API_HOST".to_string(), "127.0.0.1".to_string()),
            ("TTS_RUNTIME_URL".to_string(), "http://runtime:9000".to_string()),
        ]);
        let cfg = load_config_from::<TtsConfig>("test", Some(env)).expect("config");
        assert_eq!(cfg.service.model.backbone_device, "cpu");
        assert_eq!(cfg.service.model.codec_device, "cuda");
        assert_eq!(cfg.service.voices.default_voice, "Vinh");
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.service.model.runtime_url, "http://runtime:9000");
    }

    #[test]
    fn prefixed_variables_reach_nested_fields() {
        let env = HashMap::from([(
            "TTS_SERVICE__SERVICE__MODEL__READINESS_ATTEMPTS".to_string(),
            "3".to_string(),
        )]);
        let cfg = load_config_from::<TtsConfig>("test", Some(env)).expect("config");
        assert_eq!(cfg.service.model.readiness_attempts, 3);
    }
}
