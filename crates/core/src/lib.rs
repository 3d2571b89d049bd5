pub mod agent;
pub mod llm_client;
pub mod remote;

pub use agent::{
    AgentAdapter, AgentError, AgentOutput, ConfidenceScorer, FixedConfidence, Query, QueryResult,
    RagAgent,
};
pub use llm_client::OpenAICompatibleAgent;
pub use remote::HttpRagAgent;
