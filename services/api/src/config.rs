use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Agent provider is set to 'none'; no agent is configured")]
    AgentDisabled,
}

/// Defines the supported backends for the RAG agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
    /// An external RAG service reached over HTTP.
    Http,
    /// Run without an agent; agent-dependent endpoints report unavailable.
    Disabled,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub gemini_api_key: Option<String>,
    pub rag_service_url: Option<String>,
    pub chat_model: String,
    /// Overrides the built-in system prompt of OpenAI-compatible providers.
    pub system_prompt: Option<String>,
    pub agent_timeout: Option<Duration>,
    pub cors_origins: Vec<String>,
    pub logs_dir: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// Missing provider credentials are not an error here; the agent is built
    /// separately and degrades to unavailable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let provider_str = std::env::var("AGENT_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            "http" => Provider::Http,
            "none" => Provider::Disabled,
            other => {
                return Err(ConfigError::InvalidValue(
                    "AGENT_PROVIDER".to_string(),
                    format!("'{}' is not one of openai, gemini, http, none", other),
                ));
            }
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let openai_api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| "https://api.openai.com/v1/".to_string());
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let rag_service_url = std::env::var("RAG_SERVICE_URL").ok();

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let system_prompt = std::env::var("SYSTEM_PROMPT")
            .ok()
            .filter(|prompt| !prompt.trim().is_empty());

        let agent_timeout = match std::env::var("AGENT_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "AGENT_TIMEOUT_SECS".to_string(),
                        format!("'{}' is not a whole number of seconds", raw),
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let logs_dir = std::env::var("LOGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./logs"));
        let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            provider,
            openai_api_key,
            openai_api_base,
            gemini_api_key,
            rag_service_url,
            chat_model,
            system_prompt,
            agent_timeout,
            cors_origins,
            logs_dir,
            static_dir,
            log_level,
        })
    }

    /// Returns the credential or endpoint the configured provider needs, or
    /// the name of the variable that is missing.
    pub fn provider_credential(&self) -> Result<&str, ConfigError> {
        let (value, var) = match self.provider {
            Provider::OpenAI => (self.openai_api_key.as_deref(), "OPENAI_API_KEY"),
            Provider::Gemini => (self.gemini_api_key.as_deref(), "GEMINI_API_KEY"),
            Provider::Http => (self.rag_service_url.as_deref(), "RAG_SERVICE_URL"),
            Provider::Disabled => return Err(ConfigError::AgentDisabled),
        };
        value.ok_or_else(|| ConfigError::MissingVar(var.to_string()))
    }
}
