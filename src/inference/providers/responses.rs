//! Wire pieces shared by the Responses API providers: message roles, status
//! handling and the server-sent event stream.
//!
//! Both OpenRouter and LM Studio stream `text/event-stream` bodies made of
//! `event:` / `data:` line pairs. OpenRouter sometimes omits the `event:` line
//! and only names the event in the JSON `type` field, so the decoder falls
//! back to that.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::{ProviderError, Source, StreamChunk};

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub(super) enum Role {
    System,
    User,
    Assistant,
}

impl From<Source> for Role {
    fn from(source: Source) -> Self {
        match source {
            Source::Directive => Role::System,
            Source::User => Role::User,
            Source::Model => Role::Assistant,
        }
    }
}

/// One decoded event from the stream, already sorted by what it means to us.
#[derive(Debug, PartialEq)]
pub(super) enum ResponseEvent {
    Content(String),
    Thinking(String),
    Completed,
    Ignored,
}

#[derive(Deserialize, Debug)]
struct EventPayload {
    #[serde(rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    delta: String,
}

/// Incremental decoder; bytes may split lines (and UTF-8 sequences) anywhere.
#[derive(Default)]
pub(super) struct EventDecoder {
    pending: Vec<u8>,
    event_name: Option<String>,
}

impl EventDecoder {
    /// Feeds raw bytes and returns every event whose `data:` line is now complete.
    pub(super) fn feed(&mut self, bytes: &[u8]) -> Vec<ResponseEvent> {
        self.pending.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            if let Some(event) = self.line(line.trim()) {
                events.push(event);
            }
        }
        events
    }

    fn line(&mut self, line: &str) -> Option<ResponseEvent> {
        if let Some(name) = line.strip_prefix("event:") {
            self.event_name = Some(name.trim().to_string());
            return None;
        }
        let data = line.strip_prefix("data:")?.trim();
        if data == "[DONE]" {
            debug!("Received [DONE] marker");
            return None;
        }

        let payload = serde_json::from_str::<EventPayload>(data).ok();
        let name = self
            .event_name
            .take()
            .or_else(|| payload.as_ref().and_then(|p| p.event_type.clone()));
        let delta = payload.map(|p| p.delta).unwrap_or_default();

        Some(match name.as_deref() {
            Some("response.output_text.delta") if !delta.is_empty() => {
                ResponseEvent::Content(delta)
            }
            Some("response.reasoning_text.delta" | "response.reasoning_summary_text.delta")
                if !delta.is_empty() =>
            {
                ResponseEvent::Thinking(delta)
            }
            Some("response.completed") => ResponseEvent::Completed,
            Some(other) => {
                debug!("Ignoring event '{}' ({} bytes)", other, data.len());
                ResponseEvent::Ignored
            }
            None => {
                debug!("Data line without an event name: {}", data);
                ResponseEvent::Ignored
            }
        })
    }
}

/// Passes a successful response through; turns anything else into `ProviderError::Api`.
pub(super) async fn error_for_status(
    response: reqwest::Response,
    provider: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    debug!("{} response status: {}", provider, status);
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    warn!("{} API error: {} - {}", provider, status.as_u16(), message);
    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Reads the event stream to the end (or to `response.completed`) and sends
/// each text delta to `sender`.
pub(super) async fn forward(
    mut response: reqwest::Response,
    sender: &Sender<StreamChunk>,
    provider: &str,
) -> Result<(), ProviderError> {
    let mut decoder = EventDecoder::default();
    let mut chunk_count = 0usize;
    let mut content_bytes = 0usize;

    while let Some(bytes) = response
        .chunk()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?
    {
        debug!("{}: {} raw bytes", provider, bytes.len());
        for event in decoder.feed(&bytes) {
            let chunk = match event {
                ResponseEvent::Content(text) => {
                    content_bytes += text.len();
                    StreamChunk::Content(text)
                }
                ResponseEvent::Thinking(text) => StreamChunk::Thinking(text),
                ResponseEvent::Completed => {
                    info!(
                        "{} stream complete: {} chunks, {} content bytes",
                        provider, chunk_count, content_bytes
                    );
                    return Ok(());
                }
                ResponseEvent::Ignored => continue,
            };
            chunk_count += 1;
            if sender.send(chunk).await.is_err() {
                warn!("Chunk send failed: receiver dropped");
                return Err(ProviderError::ChannelClosed);
            }
        }
    }

    info!(
        "{} stream ended without a completion event: {} chunks, {} content bytes",
        provider, chunk_count, content_bytes
    );
    Ok(())
}
