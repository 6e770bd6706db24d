use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;

use crate::config::HttpConfig;

/// Serve the given router until the process is stopped.
pub async fn run(http: &HttpConfig, app: Router) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = app
        .layer(TimeoutLayer::new(Duration::from_secs(
            http.request_timeout_seconds,
        )))
        .layer(cors);

    let addr = format!("{}:{}", http.host, http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated")?;

    Ok(())
}
