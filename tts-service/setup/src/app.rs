use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Context, Error};
use shared::{resolve_bind_addr, serve_listener, shutdown_signal, ModelSlot};
use tokio::{net::TcpListener, task::JoinHandle};
use tts_application::{ModelDescriptor, TtsUseCase, TtsUseCaseImpl};
use tts_configuration::AppConfig;
use tts_domain::TtsModel;
use tts_http_server::{build_router, AppState};

use crate::loader::{ModelLoader, RuntimeModelLoader};

pub async fn build_and_run(config: AppConfig) -> Result<(), Error> {
    let app = Application::new(config)?;
    app.run().await
}

pub struct Application {
    pub config: AppConfig,
    slot: Arc<ModelSlot<TtsModel>>,
    state: AppState,
    loader: Arc<dyn ModelLoader>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let loader = Arc::new(RuntimeModelLoader::from_config(&config));
        Self::with_loader(config, loader)
    }

    pub fn with_loader(config: AppConfig, loader: Arc<dyn ModelLoader>) -> Result<Self, Error> {
        if config.service.voices.default_voice.trim().is_empty() {
            return Err(anyhow!("service.voices.default_voice must not be empty"));
        }

        tracing::info!(
            backbone = %config.service.model.backbone_repo,
            codec = %config.service.model.codec_repo,
            default_voice = %config.service.voices.default_voice,
            background_load = config.service.model.background_load,
            "initializing TTS application"
        );

        let slot: Arc<ModelSlot<TtsModel>> = Arc::new(ModelSlot::empty());
        let usecase: Arc<dyn TtsUseCase> = Arc::new(TtsUseCaseImpl::new(
            slot.clone(),
            ModelDescriptor {
                model: config.service.model.backbone_repo.clone(),
                default_voice: config.service.voices.default_voice.clone(),
            },
        ));

        Ok(Self {
            config,
            slot,
            state: AppState { usecase },
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
            "starting TTS HTTP server"
        );

        self.run_with_listener(listener, shutdown_signal()).await
    }

    /// Loads the model (or schedules it), serves until `shutdown`, then releases the model.
    pub async fn run_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let default_voice = self.config.service.voices.default_voice.clone();
        let pending_load = if self.config.service.model.background_load {
            let slot = self.slot.clone();
            let loader = self.loader.clone();
            Some(tokio::spawn(async move {
                if let Err(err) = load_into_slot(&slot, loader.as_ref(), &default_voice).await {
                    tracing::error!(error = %err, "background model load failed");
                }
            }))
        } else {
            load_into_slot(&self.slot, self.loader.as_ref(), &default_voice).await?;
            None
        };

        let router = build_router(
            self.state.clone(),
            self.config.service.synthesis.max_body_bytes,
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
    slot: &ModelSlot<TtsModel>,
    loader: &dyn ModelLoader,
    default_voice: &str,
) -> Result<(), Error> {
    let started = std::time::Instant::now();
    let model = loader
        .load()
        .await
        .map_err(|err| anyhow!("failed to load TTS model: {err}"))?;

    if !model.catalog.contains(default_voice) {
        tracing::warn!(
            default_voice,
            "default voice is not in the catalog; requests without `voice` will be rejected"
        );
    }

    slot.install(model);
    tracing::info!(
        load_seconds = started.elapsed().as_secs_f64(),
        "TTS model ready"
    );
    Ok(())
}
