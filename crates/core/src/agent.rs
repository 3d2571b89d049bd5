//! Agent Adapter
//!
//! This module adapts an external retrieval-augmented generation agent to the
//! query contract used by the HTTP and WebSocket layers. The agent itself is an
//! opaque collaborator behind the [`RagAgent`] trait; the [`AgentAdapter`] adds
//! timing, confidence scoring and a uniform error taxonomy on top of it.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Text returned when the agent produced no usable generation.
pub const NO_RESPONSE_FALLBACK: &str = "No response generated";

/// The language assumed when a query does not carry one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// The raw result of a single agent invocation.
///
/// Only `generation` is interpreted; any additional fields the agent reports
/// (retrieved documents, routing decisions, ...) are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    #[serde(default)]
    pub generation: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AgentOutput {
    /// Creates an output carrying only a generation.
    pub fn from_generation(generation: impl Into<String>) -> Self {
        Self {
            generation: Some(generation.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Returns the generation text, or [`NO_RESPONSE_FALLBACK`] when it is
    /// missing or blank.
    pub fn response_text(&self) -> String {
        match self.generation.as_deref() {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => NO_RESPONSE_FALLBACK.to_string(),
        }
    }
}

/// A retrieval-augmented generation agent.
///
/// Implementations are trusted to either return or fail; the adapter does not
/// retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RagAgent: Send + Sync {
    /// Runs the agent on a single user query.
    async fn run(&self, query: &str) -> Result<AgentOutput>;
}

/// Scores how confident the façade is in an agent's answer.
///
/// No real scoring exists yet; [`FixedConfidence`] is the default.
pub trait ConfidenceScorer: Send + Sync {
    fn score(&self, query: &str, output: &AgentOutput) -> f64;
}

/// A scorer that always reports the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfidence(pub f64);

impl Default for FixedConfidence {
    fn default() -> Self {
        Self(0.95)
    }
}

impl ConfidenceScorer for FixedConfidence {
    fn score(&self, _query: &str, _output: &AgentOutput) -> f64 {
        self.0
    }
}

/// A user query addressed to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub language: String,
}

impl Query {
    /// Creates a query in the default language.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// The adapted result of a successful query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub response: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    /// Wall-clock seconds spent inside the agent call.
    pub processing_time: f64,
    pub language: String,
}

/// Failures surfaced by the [`AgentAdapter`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// No agent was configured, or it failed to initialize at startup.
    #[error("Voice agent not available")]
    Unavailable,
    /// The agent failed while handling this particular query.
    #[error("{0}")]
    ProcessingFailed(String),
}

/// Wraps an optional [`RagAgent`] and exposes the façade's query contract.
///
/// An adapter without an agent is a valid, explicitly constructed state: every
/// query against it fails with [`AgentError::Unavailable`].
#[derive(Clone)]
pub struct AgentAdapter {
    agent: Option<Arc<dyn RagAgent>>,
    scorer: Arc<dyn ConfidenceScorer>,
    timeout: Option<Duration>,
}

impl AgentAdapter {
    pub fn new(agent: Arc<dyn RagAgent>) -> Self {
        Self {
            agent: Some(agent),
            scorer: Arc::new(FixedConfidence::default()),
            timeout: None,
        }
    }

    /// An adapter whose agent could not be initialized.
    pub fn unavailable() -> Self {
        Self {
            agent: None,
            scorer: Arc::new(FixedConfidence::default()),
            timeout: None,
        }
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Bounds every agent call by `timeout`. Expiry is reported as
    /// [`AgentError::ProcessingFailed`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_available(&self) -> bool {
        self.agent.is_some()
    }

    /// Runs `query` through the agent.
    pub async fn query(&self, query: &Query) -> Result<QueryResult, AgentError> {
        let agent = self.agent.as_ref().ok_or(AgentError::Unavailable)?;

        let started = Instant::now();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, agent.run(&query.text)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(timeout_secs = limit.as_secs_f64(), "Agent call timed out");
                    return Err(AgentError::ProcessingFailed(format!(
                        "agent did not respond within {}s",
                        limit.as_secs_f64()
                    )));
                }
            },
            None => agent.run(&query.text).await,
        };
        let processing_time = started.elapsed().as_secs_f64();

        let output = outcome.map_err(|e| {
            warn!(error = ?e, "Agent call failed");
            AgentError::ProcessingFailed(e.to_string())
        })?;

        let confidence = self.scorer.score(&query.text, &output).clamp(0.0, 1.0);
        debug!(processing_time, confidence, "Agent call completed");

        Ok(QueryResult {
            response: output.response_text(),
            confidence,
            processing_time,
            language: query.language.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use approx::assert_relative_eq;
    use mockall::predicate::eq;

    fn adapter_with(mock: MockRagAgent) -> AgentAdapter {
        AgentAdapter::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_query_wraps_generation() {
        let mut mock = MockRagAgent::new();
        mock.expect_run()
            .with(eq("hello"))
            .times(1)
            .returning(|_| Ok(AgentOutput::from_generation("hi there")));

        let result = adapter_with(mock)
            .query(&Query::new("hello").with_language("hi"))
            .await
            .unwrap();

        assert_eq!(result.response, "hi there");
        assert_relative_eq!(result.confidence, 0.95);
        assert!(result.processing_time >= 0.0);
        assert_eq!(result.language, "hi");
    }

    #[tokio::test]
    async fn test_missing_generation_uses_fallback() {
        let mut mock = MockRagAgent::new();
        mock.expect_run().returning(|_| Ok(AgentOutput::default()));

        let result = adapter_with(mock).query(&Query::new("q")).await.unwrap();
        assert_eq!(result.response, NO_RESPONSE_FALLBACK);
        assert_eq!(result.language, DEFAULT_LANGUAGE);
    }

    #[tokio::test]
    async fn test_blank_generation_uses_fallback() {
        let mut mock = MockRagAgent::new();
        mock.expect_run()
            .returning(|_| Ok(AgentOutput::from_generation("   ")));

        let result = adapter_with(mock).query(&Query::new("q")).await.unwrap();
        assert_eq!(result.response, NO_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn test_empty_query_is_passed_through() {
        let mut mock = MockRagAgent::new();
        mock.expect_run()
            .with(eq(""))
            .times(1)
            .returning(|_| Ok(AgentOutput::from_generation("ok")));

        let result = adapter_with(mock).query(&Query::new("")).await.unwrap();
        assert_eq!(result.response, "ok");
    }

    #[tokio::test]
    async fn test_agent_failure_maps_to_processing_failed() {
        let mut mock = MockRagAgent::new();
        mock.expect_run()
            .returning(|_| Err(anyhow!("vector store unreachable")));

        let err = adapter_with(mock).query(&Query::new("q")).await.unwrap_err();
        assert_eq!(
            err,
            AgentError::ProcessingFailed("vector store unreachable".to_string())
        );
    }

    #[tokio::test]
    async fn test_unavailable_adapter() {
        let adapter = AgentAdapter::unavailable();
        assert!(!adapter.is_available());

        let err = adapter.query(&Query::new("q")).await.unwrap_err();
        assert_eq!(err, AgentError::Unavailable);
        assert_eq!(err.to_string(), "Voice agent not available");
    }

    struct SlowAgent;

    #[async_trait]
    impl RagAgent for SlowAgent {
        async fn run(&self, _query: &str) -> Result<AgentOutput> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(AgentOutput::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_processing_failed() {
        let adapter = AgentAdapter::new(Arc::new(SlowAgent))
            .with_timeout(Some(Duration::from_secs(2)));

        let err = adapter.query(&Query::new("q")).await.unwrap_err();
        match err {
            AgentError::ProcessingFailed(message) => assert!(message.contains("2s")),
            other => panic!("Expected ProcessingFailed, got {:?}", other),
        }
    }

    struct OverconfidentScorer;

    impl ConfidenceScorer for OverconfidentScorer {
        fn score(&self, _query: &str, _output: &AgentOutput) -> f64 {
            3.5
        }
    }

    #[tokio::test]
    async fn test_confidence_is_clamped() {
        let mut mock = MockRagAgent::new();
        mock.expect_run()
            .returning(|_| Ok(AgentOutput::from_generation("x")));

        let result = adapter_with(mock)
            .with_scorer(Arc::new(OverconfidentScorer))
            .query(&Query::new("q"))
            .await
            .unwrap();
        assert_relative_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_agent_output_keeps_extra_fields() {
        let json = r#"{"generation": "answer", "documents": ["a", "b"]}"#;
        let output: AgentOutput = serde_json::from_str(json).unwrap();

        assert_eq!(output.generation.as_deref(), Some("answer"));
        assert!(output.extra.contains_key("documents"));
    }
}
