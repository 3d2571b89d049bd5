//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API, the voice WebSocket endpoint, OpenAPI
//! documentation and, optionally, the built frontend.

use crate::{
    handlers,
    models::{
        CallRecording, CallVolumePoint, DashboardMetrics, ErrorResponse, HealthResponse,
        LanguageShare, LlmSettings, LogEntry, MessageResponse, MetricStatus, ModelConfig,
        ModelKind, ModelSettings, QueryRequest, QueryResponse, SttSettings, SystemMetric, Trend,
        TtsSettings,
    },
    state::AppState,
    ws::ws_handler,
};

use axum::{
    Router,
    routing::{get, post, put},
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::process_query,
        handlers::get_dashboard_metrics,
        handlers::get_call_recordings,
        handlers::get_model_configurations,
        handlers::update_model_configuration,
        handlers::get_system_metrics,
        handlers::get_system_logs,
    ),
    components(
        schemas(
            HealthResponse, QueryRequest, QueryResponse, DashboardMetrics, CallVolumePoint,
            LanguageShare, CallRecording, ModelConfig, ModelKind, ModelSettings, SttSettings,
            TtsSettings, LlmSettings, SystemMetric, MetricStatus, Trend, LogEntry,
            MessageResponse, ErrorResponse
        )
    ),
    tags(
        (name = "Voice Agent API", description = "HTTP façade and dashboard for the voice agent")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
///
/// When `static_dir` is given, paths not matched by the API are served from
/// it, with `index.html` as the fallback for client-side routes.
pub fn create_router(app_state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    // Group all routes that require AppState into their own router.
    let api_router = Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/query", post(handlers::process_query))
        .route("/api/dashboard/metrics", get(handlers::get_dashboard_metrics))
        .route("/api/recordings", get(handlers::get_call_recordings))
        .route("/api/models", get(handlers::get_model_configurations))
        .route(
            "/api/models/{model_id}",
            put(handlers::update_model_configuration),
        )
        .route("/api/system/metrics", get(handlers::get_system_metrics))
        .route("/api/logs", get(handlers::get_system_logs))
        .route("/ws/voice", get(ws_handler))
        // Apply the state ONLY to this group of routes.
        .with_state(app_state);

    // Merge the stateful routes with the stateless ones (like Swagger UI).
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router);

    let router = match static_dir {
        Some(dir) => router.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        ),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}
