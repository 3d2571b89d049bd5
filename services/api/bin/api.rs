//! Main Entrypoint for the Voice Agent API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Building the RAG agent client, or degrading to "unavailable" if it cannot be built.
//! 3. Constructing the Axum router and applying middleware.
//! 4. Starting the web server and handling graceful shutdown.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};
use voice_agent_api::{
    config::Config, provider::build_agent, router::create_router, state::AppState,
};
use voice_agent_core::AgentAdapter;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = ?e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let values = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{}'", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(values)
    };
    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing application state...");

    // --- 3. Initialize the Agent ---
    let agent = match build_agent(&config) {
        Ok(Some(agent)) => {
            info!(provider = ?config.provider, "Voice agent initialized successfully");
            AgentAdapter::new(agent).with_timeout(config.agent_timeout)
        }
        Ok(None) => {
            info!("Agent provider is 'none'; agent-dependent calls will report unavailable");
            AgentAdapter::unavailable()
        }
        Err(e) => {
            // Serve everything else; agent-dependent calls report unavailable.
            error!(provider = ?config.provider, error = %e, "Failed to initialize voice agent");
            AgentAdapter::unavailable()
        }
    };

    let app_state = Arc::new(AppState::new(agent, config.logs_dir.clone()));

    // --- 4. Create Router and Apply Middleware ---
    if let Some(dir) = &config.static_dir {
        if !dir.is_dir() {
            warn!(
                static_dir = %dir.display(),
                "Static directory does not exist; frontend requests will 404"
            );
        }
    }
    let app = create_router(app_state, config.static_dir.as_deref())
        .layer(cors_layer(&config.cors_origins)?);

    // --- 5. Start Server ---
    info!(
        provider = ?config.provider,
        model = %config.chat_model,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server has shut down.");
    Ok(())
}
