use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tts_configuration::AppConfig;
use tts_domain::{DomainError, TtsModel};
use tts_infra_tts_rest::{FileVoiceCatalog, RestRuntimeConfig, RestSynthesisClient};

#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<TtsModel>, DomainError>;
}

/// Reads the voice presets from disk and brings up the REST acoustic runtime.
pub struct RuntimeModelLoader {
    voices_dir: String,
    runtime: RestRuntimeConfig,
}

impl RuntimeModelLoader {
    pub fn from_config(config: &AppConfig) -> Self {
        let model = &config.service.model;
        Self {
            voices_dir: config.service.voices.voices_dir.clone(),
            runtime: RestRuntimeConfig {
                base_url: model.runtime_url.clone(),
                backbone_repo: model.backbone_repo.clone(),
                backbone_device: model.backbone_device.clone(),
                codec_repo: model.codec_repo.clone(),
                codec_device: model.codec_device.clone(),
                memory_util: model.memory_util,
                request_timeout: Duration::from_secs(model.request_timeout_secs),
                readiness_attempts: model.readiness_attempts,
                readiness_delay: Duration::from_millis(model.readiness_delay_ms),
            },
        }
    }
}

#[async_trait]
impl ModelLoader for RuntimeModelLoader {
    async fn load(&self) -> Result<Arc<TtsModel>, DomainError> {
        let voices_dir = self.voices_dir.clone();
        let catalog = tokio::task::spawn_blocking(move || FileVoiceCatalog::load(voices_dir))
            .await
            .map_err(|err| DomainError::internal_error(&format!("voice catalog task failed: {err}")))??;
        let synthesizer = RestSynthesisClient::connect(self.runtime.clone()).await?;

        Ok(Arc::new(TtsModel {
            catalog: Arc::new(catalog),
            synthesizer: Arc::new(synthesizer),
        }))
    }
}
