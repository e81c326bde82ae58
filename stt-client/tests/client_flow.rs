use serde_json::json;
use stt_client::{run, Args};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn args(base_url: String) -> Args {
    Args {
        base_url,
        file: None,
        language: "vi".to_string(),
        task: "transcribe".to_string(),
    }
}

#[tokio::test]
async fn checks_health_uploads_tone_and_lists_segments() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "model": "large-v3",
            "device": "cpu",
            "uptime_seconds": 1.0
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "xin chào các bạn",
            "segments": [
                { "start": 0.0, "end": 1.2, "text": "xin chào" },
                { "start": 1.2, "end": 2.5, "text": "các bạn" }
            ],
            "language": "vi",
            "language_probability": 0.987,
            "duration": 3.0,
            "process_time": 0.42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = run(args(server.uri())).await.expect("client run");

    assert!(report.contains("Text: xin chào các bạn"));
    assert!(report.contains("Language: vi (0.987)"));
    assert!(report.contains("[0.00s -> 1.20s] xin chào"));
    assert!(report.contains("[1.20s -> 2.50s] các bạn"));

    let requests = server.received_requests().await.expect("recorded");
    let upload = requests
        .iter()
        .find(|request| request.url.path() == "/api/transcribe")
        .expect("upload request");
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("name=\"language\""));
    assert!(body.contains("RIFF"));
}

#[tokio::test]
async fn server_error_is_reported_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "detail": "Model not loaded yet" })),
        )
        .mount(&server)
        .await;

    let error = run(args(server.uri())).await.expect_err("service unavailable");
    let message = error.to_string();
    assert!(message.contains("503"));
    assert!(message.contains("Model not loaded yet"));
}

#[tokio::test]
async fn unhealthy_service_stops_before_upload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/transcribe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let error = run(args(server.uri())).await.expect_err("health fails");
    assert!(error.to_string().contains("health check returned 500"));
}
