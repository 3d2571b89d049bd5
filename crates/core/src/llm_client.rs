use crate::agent::{AgentOutput, RagAgent};
use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use tracing::debug;

/// System prompt used when none is supplied.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful multilingual voice assistant. \
Answer the caller's question concisely in the language it was asked in.";

/// A `RagAgent` backed by any OpenAI-compatible chat-completion API.
///
/// The assistant message of the first choice becomes the agent's `generation`.
pub struct OpenAICompatibleAgent {
    client: Client<OpenAIConfig>,
    model: String,
    system_prompt: String,
}

impl OpenAICompatibleAgent {
    /// Creates a new agent for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gpt-4o").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }
}

#[async_trait]
impl RagAgent for OpenAICompatibleAgent {
    async fn run(&self, query: &str) -> Result<AgentOutput> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.clone())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(query.to_string())
                    .build()?
                    .into(),
            ])
            .build()?;

        let response: CreateChatCompletionResponse = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        let generation = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone());
        debug!(model = %self.model, has_generation = generation.is_some(), "LLM responded");

        Ok(AgentOutput {
            generation,
            ..Default::default()
        })
    }
}
