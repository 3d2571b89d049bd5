//! Defines the WebSocket message protocol between the browser client and the API server.

use serde::{Deserialize, Serialize};

/// Text sent back for every `audio_data` frame until real transcription is wired in.
pub const TRANSCRIPTION_PLACEHOLDER: &str = "Transcribed text would appear here";

/// Confidence reported alongside [`TRANSCRIPTION_PLACEHOLDER`].
pub const PLACEHOLDER_CONFIDENCE: f64 = 0.95;

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A chunk of captured audio. The payload is not decoded.
    AudioData {
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    /// A typed question for the agent.
    TextQuery {
        query: String,
        #[serde(default)]
        language: Option<String>,
    },
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// What the server heard in the client's audio.
    Transcription { text: String, confidence: f64 },
    /// The agent's answer to a `text_query`.
    AgentResponse { text: String, confidence: f64 },
    /// A failure handling one message. The connection stays open.
    Error { message: String },
}
