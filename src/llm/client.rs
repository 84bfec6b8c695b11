// Streaming LLM client for remote draft reviews.
//
// Sends the review prompt to the Anthropic Messages API with `stream: true`
// and folds the Server-Sent Events into `LlmEvent` variants forwarded over
// an mpsc channel to the studio event loop.
//
// Credentials and the model id are not ambient state: every call receives
// an explicit `ReviewerSettings`, so runtime settings changes apply to the
// next request without rebuilding the client.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::LlmEvent;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Error surfaced when a review is requested without a credential. A
/// precondition failure: no request is attempted.
pub const MISSING_KEY_ERROR: &str = "Add an API key to run a remote review.";

// ---------------------------------------------------------------------------
// ReviewerSettings
// ---------------------------------------------------------------------------

/// Per-invocation settings for the remote reviewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewerSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

impl ReviewerSettings {
    /// The credential, if present and non-empty after trimming.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// ReviewClient
// ---------------------------------------------------------------------------

/// Streaming review client. Holds only the HTTP connection pool; all
/// request parameters arrive with each call.
pub struct ReviewClient {
    http: reqwest::Client,
}

impl ReviewClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Stream a review as `LlmEvent`s over `tx`.
    ///
    /// The `epoch` is threaded through every emitted event so the receiving
    /// side can discard events that belong to an abandoned session.
    ///
    /// Returns when the stream completes, an error occurs, or the receiver
    /// is dropped.
    pub async fn stream_review(
        &self,
        settings: &ReviewerSettings,
        system: &str,
        user_content: &str,
        tx: mpsc::Sender<LlmEvent>,
        epoch: u64,
    ) -> anyhow::Result<()> {
        let Some(api_key) = settings.credential() else {
            let _ = tx
                .send(LlmEvent::Error {
                    message: MISSING_KEY_ERROR.to_string(),
                    epoch,
                })
                .await;
            return Ok(());
        };

        let body = serde_json::json!({
            "model": settings.model,
            "max_tokens": settings.max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let _ = tx
                    .send(LlmEvent::Error {
                        message: format!("Failed to create event source: {e}"),
                        epoch,
                    })
                    .await;
                return Ok(());
            }
        };

        let mut full_text = String::new();
        let mut stop_reason: Option<String> = None;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => {
                    let event_type = msg.event.as_str();
                    let data = &msg.data;

                    match event_type {
                        "content_block_delta" => {
                            if let Some(text) = parse_delta_text(data) {
                                full_text.push_str(&text);
                                if tx.send(LlmEvent::Token { text, epoch }).await.is_err() {
                                    // Receiver dropped — abort stream.
                                    es.close();
                                    return Ok(());
                                }
                            }
                        }
                        "message_delta" => {
                            if let Some(reason) = parse_stop_reason(data) {
                                stop_reason = Some(reason);
                            }
                        }
                        "message_stop" => {
                            debug!("message_stop — streaming complete");
                            let _ = tx
                                .send(LlmEvent::Complete {
                                    full_text,
                                    stop_reason,
                                    epoch,
                                })
                                .await;
                            es.close();
                            return Ok(());
                        }
                        // Ignore ping, message_start, content_block_start, etc.
                        _ => {
                            debug!(event_type, "ignoring SSE event");
                        }
                    }
                }
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    let _ = tx
                        .send(LlmEvent::Error {
                            message: extract_error_message(&err),
                            epoch,
                        })
                        .await;
                    es.close();
                    return Ok(());
                }
            }
        }

        // Stream ended without message_stop (shouldn't normally happen).
        if full_text.is_empty() {
            let _ = tx
                .send(LlmEvent::Error {
                    message: "Stream ended unexpectedly without any content".to_string(),
                    epoch,
                })
                .await;
        } else {
            let _ = tx
                .send(LlmEvent::Complete {
                    full_text,
                    stop_reason,
                    epoch,
                })
                .await;
        }

        Ok(())
    }
}

impl Default for ReviewClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// Extract `delta.text` from a `content_block_delta` event's JSON.
///
/// Expected shape: `{ "type": "content_block_delta", "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract `delta.stop_reason` from a `message_delta` event's JSON.
///
/// Expected shape: `{ "type": "message_delta", "delta": { "stop_reason": "end_turn" } }`
pub(crate) fn parse_stop_reason(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("stop_reason")?
        .as_str()
        .map(|s| s.to_string())
}

/// Extract a human-readable error message from an SSE error.
fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => {
            format!("Network error: {e}")
        }
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
