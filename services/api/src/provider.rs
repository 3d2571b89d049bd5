//! Construction of the RAG agent selected by configuration.

use crate::config::{Config, Provider};
use anyhow::Result;
use async_openai::config::OpenAIConfig;
use std::sync::Arc;
use voice_agent_core::{HttpRagAgent, OpenAICompatibleAgent, RagAgent};

/// Gemini's OpenAI-compatible endpoint.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Builds the agent client for the configured provider.
///
/// Returns `Ok(None)` when the provider is `none`, and an error when the
/// provider's credential is missing.
pub fn build_agent(config: &Config) -> Result<Option<Arc<dyn RagAgent>>> {
    let openai_compatible = |api_base: &str| -> Result<Option<Arc<dyn RagAgent>>> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.provider_credential()?)
            .with_api_base(api_base);
        let mut agent = OpenAICompatibleAgent::new(openai_config, config.chat_model.clone());
        if let Some(prompt) = &config.system_prompt {
            agent = agent.with_system_prompt(prompt.clone());
        }
        Ok(Some(Arc::new(agent)))
    };

    match config.provider {
        Provider::OpenAI => openai_compatible(&config.openai_api_base),
        Provider::Gemini => openai_compatible(GEMINI_API_BASE),
        Provider::Http => Ok(Some(Arc::new(HttpRagAgent::new(
            config.provider_credential()?,
        )))),
        Provider::Disabled => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::path::PathBuf;
    use tracing::Level;

    fn config(provider: Provider) -> Config {
        Config {
            bind_address: "127.0.0.1:8000".parse().unwrap(),
            provider,
            openai_api_key: None,
            openai_api_base: "https://api.openai.com/v1/".to_string(),
            gemini_api_key: None,
            rag_service_url: None,
            chat_model: "gpt-4o".to_string(),
            system_prompt: None,
            agent_timeout: None,
            cors_origins: vec![],
            logs_dir: PathBuf::from("./logs"),
            static_dir: None,
            log_level: Level::INFO,
        }
    }

    #[test]
    fn test_disabled_provider_builds_no_agent() {
        assert!(build_agent(&config(Provider::Disabled)).unwrap().is_none());
    }

    #[test]
    fn test_missing_credential_is_an_error() {
        let err = build_agent(&config(Provider::OpenAI)).err().unwrap();
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::MissingVar(var)) => assert_eq!(var, "OPENAI_API_KEY"),
            other => panic!("Expected MissingVar, got {:?}", other),
        }
    }

    #[test]
    fn test_configured_providers_build_an_agent() {
        let mut http = config(Provider::Http);
        http.rag_service_url = Some("http://rag.internal/run".to_string());
        assert!(build_agent(&http).unwrap().is_some());

        let mut gemini = config(Provider::Gemini);
        gemini.gemini_api_key = Some("test-key".to_string());
        gemini.system_prompt = Some("Be brief.".to_string());
        assert!(build_agent(&gemini).unwrap().is_some());
    }
}
