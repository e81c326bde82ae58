use std::{
    future::Future,
    net::{SocketAddr, ToSocketAddrs},
};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::settings::ServerConfig;

pub fn resolve_bind_addr(config: &ServerConfig) -> anyhow::Result<SocketAddr> {
    let bind = format!("{}:{}", config.host, config.port);
    let mut resolved = bind
        .to_socket_addrs()
        .with_context(|| format!("invalid HTTP bind address `{bind}`"))?;

    resolved
        .next()
        .with_context(|| format!("no socket address resolved for `{bind}`"))
}

pub async fn serve_listener<F>(listener: TcpListener, router: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router.layer(cors_layer());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use tokio::sync::oneshot;

    use super::*;

    #[test]
    fn bind_address_resolves_loopback() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7861,
        };
        let address = resolve_bind_addr(&config).expect("address");
        assert_eq!(address.port(), 7861);
        assert!(address.ip().is_loopback());
    }

    #[tokio::test]
    async fn served_routes_carry_cors_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let router = Router::new().route("/ping", get(|| async { "pong" }));

        let server = tokio::spawn(serve_listener(listener, router, async {
            let _ = stop_rx.await;
        }));

        let response = reqwest::Client::new()
            .get(format!("http://{address}/ping"))
            .header("Origin", "http://example.test")
            .send()
            .await
            .expect("request succeeds");

        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|value| value.to_str().ok()),
            Some("*")
        );

        let _ = stop_tx.send(());
        server.await.expect("join").expect("server stops cleanly");
    }
}
