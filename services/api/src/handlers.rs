//! Axum Handlers for the REST API
//!
//! This module contains the logic for handling HTTP requests: the health check,
//! agent queries and the dashboard endpoints. It uses `utoipa` doc comments to
//! generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use voice_agent_core::agent::{AgentError, Query};

use crate::{
    catalog::CatalogError,
    logs::fallback_logs,
    models::{
        CallRecording, DashboardMetrics, ErrorResponse, HealthResponse, LogEntry, MessageResponse,
        ModelConfig, ModelSettings, QueryRequest, QueryResponse, SystemMetric,
    },
    state::AppState,
    system::{ProbeError, fallback_metrics},
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    ServiceUnavailable(String),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, detail),
            ApiError::ServiceUnavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail),
            ApiError::InternalServerError(err) => {
                error!("Internal Server Error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalServerError(err)
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Unavailable => Self::ServiceUnavailable(err.to_string()),
            AgentError::ProcessingFailed(reason) => Self::InternalServerError(anyhow::anyhow!(
                "Query processing failed: {}",
                reason
            )),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(_) => Self::NotFound(err.to_string()),
            CatalogError::InvalidSettings { .. } => Self::BadRequest(err.to_string()),
        }
    }
}

/// Report that the service is up.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

/// Answer a text query with the RAG agent.
#[utoipa::path(
    post,
    path = "/api/query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Agent answer", body = QueryResponse),
        (status = 503, description = "Voice agent not available", body = ErrorResponse),
        (status = 500, description = "Query processing failed", body = ErrorResponse)
    )
)]
pub async fn process_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if !state.agent.is_available() {
        return Err(AgentError::Unavailable.into());
    }

    let query = Query::new(request.query.clone()).with_language(request.language());
    let result = state.agent.query(&query).await?;
    info!(
        language = %result.language,
        processing_time = result.processing_time,
        "Query answered"
    );
    Ok(Json(result.into()))
}

/// Aggregate call metrics for the dashboard.
#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardMetrics)
    )
)]
pub async fn get_dashboard_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    Ok(Json(state.dashboard.metrics().await?))
}

/// Recent call recordings.
#[utoipa::path(
    get,
    path = "/api/recordings",
    responses(
        (status = 200, description = "Call recordings", body = [CallRecording])
    )
)]
pub async fn get_call_recordings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CallRecording>>, ApiError> {
    Ok(Json(state.dashboard.recordings().await?))
}

/// Configurations of the speech and language models.
#[utoipa::path(
    get,
    path = "/api/models",
    responses(
        (status = 200, description = "Model configurations", body = [ModelConfig])
    )
)]
pub async fn get_model_configurations(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ModelConfig>> {
    Json(state.catalog.list().await)
}

/// Replace the settings of one model. The body must match the settings
/// record of the model's type.
#[utoipa::path(
    put,
    path = "/api/models/{model_id}",
    request_body = ModelSettings,
    responses(
        (status = 200, description = "Configuration updated", body = MessageResponse),
        (status = 400, description = "Settings do not match the model type", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    params(
        ("model_id" = String, Path, description = "Model ID, e.g. `llm-1`")
    )
)]
pub async fn update_model_configuration(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
    Json(config): Json<serde_json::Value>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.catalog.update(&model_id, config).await?;
    Ok(Json(MessageResponse {
        message: format!("Model {} configuration updated successfully", model_id),
    }))
}

/// Host CPU, memory and disk utilisation.
#[utoipa::path(
    get,
    path = "/api/system/metrics",
    responses(
        (
            status = 200,
            description = "System metrics; fixed values when the host cannot be probed",
            body = [SystemMetric]
        )
    )
)]
pub async fn get_system_metrics(State(state): State<Arc<AppState>>) -> Json<Vec<SystemMetric>> {
    let probe = state.probe.clone();
    let sample = tokio::task::spawn_blocking(move || probe.sample())
        .await
        .unwrap_or_else(|e| Err(ProbeError::Task(e.to_string())));

    match sample {
        Ok(usage) => Json(usage.metrics()),
        Err(e) => {
            warn!(error = %e, "System probe failed; reporting fallback metrics.");
            Json(fallback_metrics())
        }
    }
}

/// Summaries of the most recent log files.
#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (
            status = 200,
            description = "Log entries; fixed values when the log directory cannot be read",
            body = [LogEntry]
        )
    )
)]
pub async fn get_system_logs(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    match state.logs.recent().await {
        Ok(entries) => Json(entries),
        Err(e) => {
            warn!(
                dir = %state.logs.dir().display(),
                error = %e,
                "Log directory unreadable; reporting fallback logs."
            );
            Json(fallback_logs())
        }
    }
}
