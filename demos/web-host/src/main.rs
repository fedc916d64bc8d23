//! Example host serving a calculator component over WebSocket.
//!
//! Run with: cargo run -p web-host-demo
//!
//! Then send JSON requests to ws://localhost:3000/ws, e.g.
//! `{"type":"eval_expression","op":"add","x":1,"y":2}`.
//! Set `CALC_HOST_CONFIG` to a JSON file to change the bind address, the
//! default log filter or the per-request batch limit.

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, routing::get};
use calc_session::Calculator;
use calc_transport::{HostConfig, websocket::create_ws_router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HostConfig::from_env().context("loading host config")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .init();

    let calculator: Arc<Calculator> = Arc::new(Calculator::default());

    // Build router
    let app = Router::new()
        .route("/", get(index_handler))
        .merge(create_ws_router(calculator, &config))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!("Server listening on ws://{}/ws", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn index_handler() -> &'static str {
    "calculator component host: connect a WebSocket to /ws\n"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
