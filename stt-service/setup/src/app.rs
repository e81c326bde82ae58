use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Context, Error};
use shared::{resolve_bind_addr, serve_listener, shutdown_signal, ModelSlot};
use stt_application::{ModelDescriptor, SttUseCase, SttUseCaseImpl};
use stt_configuration::AppConfig;
use stt_domain::{DomainError, TranscriptionPort, VadOptions};
use stt_http_server::{build_router, AppState, FormDefaults};
use stt_infra_asr_whisper::{load_transcription_port, WhisperAdapterConfig};
use tokio::{net::TcpListener, task::JoinHandle};

/// Blocking constructor for the transcription model; runs on the blocking pool.
pub type ModelLoader =
    Arc<dyn Fn() -> Result<Arc<dyn TranscriptionPort>, DomainError> + Send + Sync>;

pub async fn build_and_run(config: AppConfig) -> Result<(), Error> {
    let app = Application::new(config)?;
    app.run().await
}

pub struct Application {
    pub config: AppConfig,
    slot: Arc<ModelSlot<dyn TranscriptionPort>>,
    state: AppState,
    loader: ModelLoader,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        #[cfg(feature = "whisper-runtime")]
        tracing::info!("whisper runtime feature enabled");
        #[cfg(not(feature = "whisper-runtime"))]
        tracing::warn!("service compiled without `whisper-runtime`; model load will fail");
        #[cfg(feature = "whisper-cuda")]
        tracing::info!("whisper backend: CUDA");
        #[cfg(feature = "whisper-vulkan")]
        tracing::info!("whisper backend: Vulkan");

        let model = &config.service.model;
        let adapter_config = WhisperAdapterConfig {
            model_path: model.resolved_model_path(),
            model_id: model.name.clone(),
            device: model.device.clone(),
            threads: model.threads,
            vad_model_path: model.vad_model_path.clone(),
        };
        let loader: ModelLoader = Arc::new(move || load_transcription_port(adapter_config.clone()));

        Self::with_loader(config, loader)
    }

    pub fn with_loader(config: AppConfig, loader: ModelLoader) -> Result<Self, Error> {
        let transcription = &config.service.transcription;
        if transcription.max_upload_bytes == 0 {
            return Err(anyhow!("service.transcription.max_upload_bytes must be positive"));
        }

        tracing::info!(
            model = %config.service.model.name,
            device = %config.service.model.device,
            background_load = config.service.model.background_load,
            "initializing STT application"
        );

        let slot: Arc<ModelSlot<dyn TranscriptionPort>> = Arc::new(ModelSlot::empty());
        let usecase: Arc<dyn SttUseCase> = Arc::new(SttUseCaseImpl::new(
            slot.clone(),
            ModelDescriptor {
                model: config.service.model.name.clone(),
                device: config.service.model.device.clone(),
            },
            VadOptions {
                min_silence_duration_ms: transcription.min_silence_duration_ms,
            },
        ));
        let state = AppState {
            usecase,
            defaults: FormDefaults {
                language: transcription.default_language.clone(),
                task: transcription.default_task.clone(),
            },
        };

        Ok(Self {
            config,
            slot,
            state,
            loader,
        })
    }

    pub async fn run(self) -> Result<(), Error> {
        let address = resolve_bind_addr(&self.config.server)?;
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("failed to bind {address}"))?;
        tracing::info!(
            host = %self.config.server.host,
            port = self.config.server.port,
            "starting STT HTTP server"
        );

        self.run_with_listener(listener, shutdown_signal()).await
    }

    /// Loads the model (or schedules it), serves until `shutdown`, then releases the model.
    pub async fn run_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let pending_load = if self.config.service.model.background_load {
            let slot = self.slot.clone();
            let loader = self.loader.clone();
            Some(tokio::spawn(async move {
                if let Err(err) = load_into_slot(&slot, loader).await {
                    tracing::error!(error = %err, "background model load failed");
                }
            }))
        } else {
            load_into_slot(&self.slot, self.loader.clone()).await?;
            None
        };

        let router = build_router(
            self.state.clone(),
            self.config.service.transcription.max_upload_bytes,
        );
        let served = serve_listener(listener, router, shutdown).await;

        // A load still in flight must land in the slot before it is released.
        if let Some(load) = pending_load {
            await_pending_load(load).await;
        }
        self.slot.release().await;
        served
    }
}

async fn await_pending_load(load: JoinHandle<()>) {
    if !load.is_finished() {
        tracing::info!("waiting for background model load before release");
    }
    if let Err(err) = load.await {
        tracing::error!(error = %err, "background model load task failed");
    }
}

async fn load_into_slot(
    slot: &ModelSlot<dyn TranscriptionPort>,
    loader: ModelLoader,
) -> Result<(), Error> {
    let started = std::time::Instant::now();
    let port = tokio::task::spawn_blocking(move || loader())
        .await
        .context("model load task failed")?
        .map_err(|err| anyhow!("failed to load transcription model: {err}"))?;

    slot.install(port);
    tracing::info!(
        load_seconds = started.elapsed().as_secs_f64(),
        "transcription model ready"
    );
    Ok(())
}
