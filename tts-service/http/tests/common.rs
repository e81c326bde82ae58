use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use reqwest::Client;
use shared::ModelSlot;
use tokio::{net::TcpListener, sync::oneshot};
use tts_application::{ModelDescriptor, TtsUseCaseImpl};
use tts_domain::{
    DomainError, SpeechSynthesisPort, SynthesisRequest, TtsModel, VoiceCatalogPort,
    VoiceReference, VoiceSummary, SPEECH_SAMPLE_RATE_HZ,
};
use tts_http_server::{build_router, AppState};

pub struct FixedCatalog;

impl VoiceCatalogPort for FixedCatalog {
    fn list_voices(&self) -> Vec<VoiceSummary> {
        vec![
            VoiceSummary {
                id: "Doan".to_string(),
                description: "Nữ miền Nam".to_string(),
            },
            VoiceSummary {
                id: "Vinh".to_string(),
                description: "Nam miền Nam".to_string(),
            },
        ]
    }

    fn voice_reference(&self, voice_id: &str) -> Result<VoiceReference, DomainError> {
        Ok(VoiceReference {
            text: format!("giọng {voice_id}"),
            codes: vec![42; 8],
        })
    }
}

/// Emits 0.1 s of a constant tone per chunk.
#[derive(Default)]
pub struct ToneSynth {
    pub calls: AtomicUsize,
}

#[async_trait]
impl SpeechSynthesisPort for ToneSynth {
    async fn synthesize(&self, _request: SynthesisRequest) -> Result<Vec<f32>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![0.25; (SPEECH_SAMPLE_RATE_HZ / 10) as usize])
    }

    fn sample_rate_hz(&self) -> u32 {
        SPEECH_SAMPLE_RATE_HZ
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub synth: Arc<ToneSynth>,
    stop: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

pub async fn setup_test_server(loaded: bool) -> Result<TestServer, Box<dyn std::error::Error>> {
    let synth = Arc::new(ToneSynth::default());
    let slot: Arc<ModelSlot<TtsModel>> = Arc::new(ModelSlot::empty());
    if loaded {
        slot.install(Arc::new(TtsModel {
            catalog: Arc::new(FixedCatalog),
            synthesizer: synth.clone(),
        }));
    }

    let usecase = TtsUseCaseImpl::new(
        slot,
        ModelDescriptor {
            model: "pnnbao-ump/VieNeu-TTS".to_string(),
            default_voice: "Doan".to_string(),
        },
    );
    let state = AppState {
        usecase: Arc::new(usecase),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    tokio::spawn(shared::serve_listener(
        listener,
        build_router(state, 1024 * 1024),
        async {
            let _ = stop_rx.await;
        },
    ));

    Ok(TestServer {
        base_url: format!("http://{address}"),
        client: Client::new(),
        synth,
        stop: Some(stop_tx),
    })
}
