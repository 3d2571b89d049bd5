//! API Models
//!
//! This module defines the request and response bodies of the HTTP API. Every
//! type derives `ToSchema` so it shows up in the generated OpenAPI document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use voice_agent_core::agent::{DEFAULT_LANGUAGE, QueryResult};

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct QueryRequest {
    #[schema(example = "What are your opening hours?")]
    pub query: String,
    /// Defaults to `"en"` when absent or null.
    #[schema(example = "en")]
    #[serde(default)]
    pub language: Option<String>,
}

impl QueryRequest {
    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub response: String,
    #[schema(minimum = 0.0, maximum = 1.0)]
    pub confidence: f64,
    /// Seconds spent in the agent call.
    pub processing_time: f64,
    pub language: String,
}

impl From<QueryResult> for QueryResponse {
    fn from(result: QueryResult) -> Self {
        Self {
            response: result.response,
            confidence: result.confidence,
            processing_time: result.processing_time,
            language: result.language,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CallVolumePoint {
    #[schema(example = "Mon")]
    pub name: String,
    pub calls: u32,
    pub duration: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LanguageShare {
    #[schema(example = "English")]
    pub name: String,
    pub value: u32,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    pub total_calls: u64,
    pub active_sessions: u64,
    pub avg_response_time: f64,
    pub success_rate: f64,
    pub call_volume_data: Vec<CallVolumePoint>,
    pub language_distribution: Vec<LanguageShare>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct CallRecording {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Call length in seconds.
    pub duration: u32,
    pub language: String,
    #[schema(example = "completed")]
    pub status: String,
    pub participant_id: String,
    pub transcription: Option<String>,
    pub sentiment: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Stt,
    Tts,
    Llm,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Stt => write!(f, "stt"),
            ModelKind::Tts => write!(f, "tts"),
            ModelKind::Llm => write!(f, "llm"),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SttSettings {
    #[schema(example = "en")]
    pub language: String,
    pub temperature: f64,
    #[schema(example = "text")]
    pub response_format: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TtsSettings {
    pub voice_id: String,
    pub speed: f64,
    pub pitch: f64,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LlmSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

/// Per-type model settings. Serialized without a tag, so the `config` object
/// of a `ModelConfig` has the same flat shape for every model type.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ModelSettings {
    Stt(SttSettings),
    Tts(TtsSettings),
    Llm(LlmSettings),
}

impl ModelSettings {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSettings::Stt(_) => ModelKind::Stt,
            ModelSettings::Tts(_) => ModelKind::Tts,
            ModelSettings::Llm(_) => ModelKind::Llm,
        }
    }

    /// Parses an untyped configuration object as the settings record for
    /// `kind`. Unknown keys and missing fields are rejected.
    pub fn parse(kind: ModelKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ModelKind::Stt => ModelSettings::Stt(serde_json::from_value(value)?),
            ModelKind::Tts => ModelSettings::Tts(serde_json::from_value(value)?),
            ModelKind::Llm => ModelSettings::Llm(serde_json::from_value(value)?),
        })
    }
}

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub provider: String,
    pub model: String,
    #[schema(example = "active")]
    pub status: String,
    pub config: ModelSettings,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Good,
    Warning,
    Critical,
}

impl MetricStatus {
    /// Classifies a utilisation percentage.
    pub fn from_percent(value: f64) -> Self {
        if value < 70.0 {
            MetricStatus::Good
        } else if value < 90.0 {
            MetricStatus::Warning
        } else {
            MetricStatus::Critical
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct SystemMetric {
    #[schema(example = "CPU Usage")]
    pub name: String,
    pub value: f64,
    #[schema(example = "%")]
    pub unit: String,
    pub status: MetricStatus,
    pub trend: Trend,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "info")]
    pub level: String,
    pub message: String,
    pub component: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
}
