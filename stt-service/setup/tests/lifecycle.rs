use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::ModelHandle;
use stt_configuration::AppConfig;
use stt_domain::{
    DomainError, TranscriptionInfo, TranscriptionOutput, TranscriptionPort, TranscriptionRequest,
};
use stt_setup::{Application, ModelLoader};
use tokio::{net::TcpListener, sync::oneshot};

struct CountingPort {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelHandle for CountingPort {
    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TranscriptionPort for CountingPort {
    async fn transcribe(
        &self,
        _request: TranscriptionRequest,
    ) -> Result<TranscriptionOutput, DomainError> {
        Ok(TranscriptionOutput::from_segments(
            Vec::new(),
            TranscriptionInfo {
                language: "vi".to_string(),
                language_probability: 1.0,
                duration: 0.0,
            },
        ))
    }
}

fn slow_loader(closes: Arc<AtomicUsize>, delay: Duration) -> ModelLoader {
    Arc::new(move || {
        std::thread::sleep(delay);
        Ok(Arc::new(CountingPort {
            closes: closes.clone(),
        }) as Arc<dyn TranscriptionPort>)
    })
}

async fn health_status(client: &reqwest::Client, base_url: &str) -> String {
    let body: serde_json::Value = client
        .get(format!("{base_url}/api/health"))
        .send()
        .await
        .expect("health request")
        .json()
        .await
        .expect("health json");
    body["status"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn background_load_reports_loading_then_ok_and_releases_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut config = AppConfig::default();
    config.service.model.background_load = true;

    let app = Application::with_loader(
        config,
        slow_loader(closes.clone(), Duration::from_millis(300)),
    )
    .expect("application");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(app.run_with_listener(listener, async {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::new();
    assert_eq!(health_status(&client, &base_url).await, "loading");

    let mut status = String::new();
    for _ in 0..50 {
        status = health_status(&client, &base_url).await;
        if status == "ok" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status, "ok");

    let _ = stop_tx.send(());
    server.await.expect("join").expect("server stops cleanly");
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn foreground_load_failure_aborts_startup() {
    let loader: ModelLoader = Arc::new(|| Err(DomainError::external_service_error("whisper", "no model")));
    let app = Application::with_loader(AppConfig::default(), loader).expect("application");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");

    let error = app
        .run_with_listener(listener, std::future::pending::<()>())
        .await
        .expect_err("load failure propagates");
    assert!(error.to_string().contains("no model"));
}

#[tokio::test]
async fn shutdown_during_background_load_still_closes_model() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut config = AppConfig::default();
    config.service.model.background_load = true;

    let app = Application::with_loader(
        config,
        slow_loader(closes.clone(), Duration::from_millis(300)),
    )
    .expect("application");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");

    let server = app.run_with_listener(listener, tokio::time::sleep(Duration::from_millis(50)));
    server.await.expect("server stops cleanly");

    assert_eq!(closes.load(Ordering::SeqCst), 1);
}
