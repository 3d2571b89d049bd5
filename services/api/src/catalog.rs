//! In-memory catalog of the speech and language models the voice agent uses.

use crate::models::{LlmSettings, ModelConfig, ModelKind, ModelSettings, SttSettings, TtsSettings};
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Model '{0}' not found")]
    NotFound(String),
    #[error("Invalid {kind} configuration: {source}")]
    InvalidSettings {
        kind: ModelKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Holds the model configurations shown on the dashboard.
///
/// Updates are validated against the model's type before they replace the
/// stored settings.
pub struct ModelCatalog {
    models: RwLock<Vec<ModelConfig>>,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelConfig>) -> Self {
        Self {
            models: RwLock::new(models),
        }
    }

    /// The default pipeline: Whisper for STT, Speechify for TTS, Llama 3 for generation.
    pub fn with_defaults() -> Self {
        let now = Utc::now();
        Self::new(vec![
            ModelConfig {
                id: "stt-1".to_string(),
                name: "Whisper Large V3".to_string(),
                kind: ModelKind::Stt,
                provider: "Groq".to_string(),
                model: "whisper-large-v3".to_string(),
                status: "active".to_string(),
                config: ModelSettings::Stt(SttSettings {
                    language: "en".to_string(),
                    temperature: 0.0,
                    response_format: "text".to_string(),
                }),
                last_updated: now,
            },
            ModelConfig {
                id: "tts-1".to_string(),
                name: "Simba Multilingual".to_string(),
                kind: ModelKind::Tts,
                provider: "Speechify".to_string(),
                model: "simba-multilingual".to_string(),
                status: "active".to_string(),
                config: ModelSettings::Tts(TtsSettings {
                    voice_id: "default".to_string(),
                    speed: 1.0,
                    pitch: 1.0,
                }),
                last_updated: now,
            },
            ModelConfig {
                id: "llm-1".to_string(),
                name: "Llama 3 70B".to_string(),
                kind: ModelKind::Llm,
                provider: "Groq".to_string(),
                model: "llama3-70b-8192".to_string(),
                status: "active".to_string(),
                config: ModelSettings::Llm(LlmSettings {
                    temperature: 0.7,
                    max_tokens: 4096,
                    top_p: 0.9,
                }),
                last_updated: now,
            },
        ])
    }

    pub async fn list(&self) -> Vec<ModelConfig> {
        self.models.read().await.clone()
    }

    /// Replaces the settings of model `id` with `config`, parsed as the
    /// settings record for that model's type.
    pub async fn update(
        &self,
        id: &str,
        config: serde_json::Value,
    ) -> Result<ModelConfig, CatalogError> {
        let mut models = self.models.write().await;
        let model = models
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let kind = model.kind;
        let settings = ModelSettings::parse(kind, config)
            .map_err(|source| CatalogError::InvalidSettings { kind, source })?;

        model.config = settings;
        model.last_updated = Utc::now();
        info!(model_id = %id, kind = %model.kind, "Model configuration updated");
        Ok(model.clone())
    }
}
