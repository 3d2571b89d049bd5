//! Client for a RAG agent running as a separate HTTP service.

use crate::agent::{AgentOutput, RagAgent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct RunRequest<'a> {
    query: &'a str,
}

/// A `RagAgent` that POSTs `{"query": ...}` to a remote endpoint and decodes
/// the `{"generation": ..., ...}` document it returns.
pub struct HttpRagAgent {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRagAgent {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RagAgent for HttpRagAgent {
    async fn run(&self, query: &str) -> Result<AgentOutput> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RunRequest { query })
            .send()
            .await
            .with_context(|| format!("Failed to reach RAG service at {}", self.endpoint))?
            .error_for_status()?;

        let output: AgentOutput = response
            .json()
            .await
            .context("RAG service returned an unexpected body")?;
        debug!(endpoint = %self.endpoint, extra_fields = output.extra.len(), "RAG service responded");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_shape() {
        let body = serde_json::to_string(&RunRequest { query: "hello" }).unwrap();
        assert_eq!(body, r#"{"query":"hello"}"#);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        // Port 9 (discard) is not expected to host an HTTP server.
        let agent = HttpRagAgent::new("http://127.0.0.1:9/run");
        let err = agent.run("hello").await.unwrap_err();
        assert!(err.to_string().contains("127.0.0.1:9"));
    }
}
