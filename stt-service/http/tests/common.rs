use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use reqwest::Client;
use shared::{ModelHandle, ModelSlot};
use stt_application::{ModelDescriptor, SttUseCaseImpl};
use stt_domain::{
    DomainError, TranscriptSegment, TranscriptionInfo, TranscriptionOutput, TranscriptionPort,
    TranscriptionRequest, VadOptions,
};
use stt_http_server::{build_router, AppState, FormDefaults};
use tokio::{net::TcpListener, sync::oneshot};

#[derive(Default)]
pub struct MockTranscriptionPort {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ModelHandle for MockTranscriptionPort {}

#[async_trait]
impl TranscriptionPort for MockTranscriptionPort {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<TranscriptionOutput, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !request.audio_path.exists() {
            return Err(DomainError::internal_error("upload missing"));
        }
        Ok(TranscriptionOutput::from_segments(
            vec![
                TranscriptSegment {
                    start: 0.0,
                    end: 1.5,
                    text: "xin chào".to_string(),
                },
                TranscriptSegment {
                    start: 1.5,
                    end: 3.0,
                    text: " các bạn ".to_string(),
                },
            ],
            TranscriptionInfo {
                language: request.language.code().unwrap_or("vi").to_string(),
                language_probability: 0.9912,
                duration: 3.0,
            },
        ))
    }
}

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub port: Arc<MockTranscriptionPort>,
    pub slot: Arc<ModelSlot<dyn TranscriptionPort>>,
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
    let port = Arc::new(MockTranscriptionPort::default());
    let slot: Arc<ModelSlot<dyn TranscriptionPort>> = Arc::new(ModelSlot::empty());
    if loaded {
        slot.install(port.clone());
    }

    let usecase = SttUseCaseImpl::new(
        slot.clone(),
        ModelDescriptor {
            model: "medium".to_string(),
            device: "cpu".to_string(),
        },
        VadOptions::default(),
    );
    let state = AppState {
        usecase: Arc::new(usecase),
        defaults: FormDefaults {
            language: "vi".to_string(),
            task: "transcribe".to_string(),
        },
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
        port,
        slot,
        stop: Some(stop_tx),
    })
}
