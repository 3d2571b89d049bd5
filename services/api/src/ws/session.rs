//! Manages the voice WebSocket connection lifecycle.

use super::{
    protocol::{ClientMessage, PLACEHOLDER_CONFIDENCE, ServerMessage, TRANSCRIPTION_PLACEHOLDER},
    registry::{ConnectionId, ConnectionRegistry},
};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use voice_agent_core::agent::{AgentAdapter, AgentError, Query};

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Runs one voice session from admission to removal.
///
/// Frames are handled strictly one at a time, so replies go out in the order
/// their messages arrived. However the loop ends, the connection is removed
/// from the registry exactly once.
#[instrument(name = "ws_voice", skip_all, fields(connection_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (connection_id, mut socket_rx) = state.registry.admit(socket).await;
    tracing::Span::current().record("connection_id", tracing::field::display(connection_id));
    info!("Voice WebSocket connected.");

    while let Some(frame) = socket_rx.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let reply = dispatch(&state.agent, text.as_str()).await;
                if let Err(e) = send_msg(&state.registry, connection_id, &reply).await {
                    // The client went away mid-dispatch; nothing left to tell it.
                    debug!(error = %e, "Dropping reply for closed connection.");
                    break;
                }
            }
            Ok(Message::Binary(data)) => {
                warn!(bytes = data.len(), "Ignoring binary frame; expected JSON text.");
            }
            Ok(Message::Close(_)) => {
                info!("Client sent close frame.");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                warn!(error = ?e, "Error receiving from client WebSocket.");
                break;
            }
        }
    }

    state.registry.remove(connection_id).await;
    info!("Voice WebSocket closed.");
}

/// Interprets one text frame and produces the reply for it.
///
/// Frames that are not valid JSON, carry an unknown `type` or miss a required
/// field are answered with an `error` message rather than dropped.
pub async fn dispatch(agent: &AgentAdapter, frame: &str) -> ServerMessage {
    let message = match serde_json::from_str::<ClientMessage>(frame) {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Rejecting malformed voice message.");
            return ServerMessage::Error {
                message: format!("Invalid message: {}", e),
            };
        }
    };

    match message {
        ClientMessage::AudioData { .. } => ServerMessage::Transcription {
            text: TRANSCRIPTION_PLACEHOLDER.to_string(),
            confidence: PLACEHOLDER_CONFIDENCE,
        },
        ClientMessage::TextQuery { query, language } => {
            let mut request = Query::new(query);
            if let Some(language) = language {
                request = request.with_language(language);
            }
            match agent.query(&request).await {
                Ok(result) => ServerMessage::AgentResponse {
                    text: result.response,
                    confidence: result.confidence,
                },
                Err(AgentError::Unavailable) => ServerMessage::Error {
                    message: AgentError::Unavailable.to_string(),
                },
                Err(AgentError::ProcessingFailed(reason)) => ServerMessage::Error {
                    message: format!("Processing failed: {}", reason),
                },
            }
        }
    }
}

/// A helper function to serialize and queue a `ServerMessage` for one connection.
pub(crate) async fn send_msg(
    registry: &ConnectionRegistry,
    connection_id: ConnectionId,
    msg: &ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(msg)?;
    registry.send_to(connection_id, serialized).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use voice_agent_core::agent::{AgentOutput, RagAgent};

    struct ScriptedAgent(Result<&'static str, &'static str>);

    #[async_trait]
    impl RagAgent for ScriptedAgent {
        async fn run(&self, _query: &str) -> anyhow::Result<AgentOutput> {
            match self.0 {
                Ok(generation) => Ok(AgentOutput::from_generation(generation)),
                Err(reason) => Err(anyhow!(reason)),
            }
        }
    }

    fn adapter(script: Result<&'static str, &'static str>) -> AgentAdapter {
        AgentAdapter::new(Arc::new(ScriptedAgent(script)))
    }

    #[tokio::test]
    async fn test_text_query_gets_agent_response() {
        let reply = dispatch(
            &adapter(Ok("hi there")),
            r#"{"type":"text_query","query":"hello"}"#,
        )
        .await;

        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"type":"agent_response","text":"hi there","confidence":0.95}"#
        );
    }

    #[tokio::test]
    async fn test_audio_data_gets_placeholder_transcription() {
        let reply = dispatch(
            &AgentAdapter::unavailable(),
            r#"{"type":"audio_data","data":"AAECAw=="}"#,
        )
        .await;

        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"type":"transcription","text":"Transcribed text would appear here","confidence":0.95}"#
        );
    }

    #[tokio::test]
    async fn test_agent_failure_becomes_error_reply() {
        let reply = dispatch(
            &adapter(Err("index offline")),
            r#"{"type":"text_query","query":"hello"}"#,
        )
        .await;

        assert_eq!(
            reply,
            ServerMessage::Error {
                message: "Processing failed: index offline".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unavailable_agent_becomes_error_reply() {
        let reply = dispatch(
            &AgentAdapter::unavailable(),
            r#"{"type":"text_query","query":"hello"}"#,
        )
        .await;

        assert_eq!(
            reply,
            ServerMessage::Error {
                message: "Voice agent not available".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_become_error_replies() {
        let agent = adapter(Ok("unused"));
        for frame in [
            "not json",
            r#"{"type":"video_frame"}"#,
            r#"{"type":"text_query"}"#,
            "42",
        ] {
            match dispatch(&agent, frame).await {
                ServerMessage::Error { message } => {
                    assert!(message.starts_with("Invalid message:"), "{}", message)
                }
                other => panic!("Expected error reply for {:?}, got {:?}", frame, other),
            }
        }
    }

    #[tokio::test]
    async fn test_send_msg_to_closed_connection_fails_quietly() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(tx).await;
        drop(rx);

        let reply = ServerMessage::Error {
            message: "late".to_string(),
        };
        assert!(send_msg(&registry, id, &reply).await.is_err());
    }
}
