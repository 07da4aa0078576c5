//! The seam between the transformer and whatever model backs it.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{Context, Effort, StreamChunk};

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Missing key, bad URL. Retrying without a config change will not help.
    Config(String),
    /// Connection refused, DNS, dropped stream.
    Network(String),
    /// Non-2xx response with its body.
    Api { status: u16, message: String },
    Parse(String),
    /// The consumer stopped listening (transform cancelled).
    ChannelClosed,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "provider not configured: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "model API returned HTTP {status}: {message}")
            }
            ProviderError::Parse(msg) => write!(f, "unreadable response: {msg}"),
            ProviderError::ChannelClosed => write!(f, "stream consumer went away"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One completion: the prompt plus sampling knobs. `None` leaves a knob to
/// the provider's default.
pub struct CompletionRequest<'a> {
    pub context: &'a Context,
    pub model: &'a str,
    pub effort: Effort,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Progress callback for [`CompletionProvider::prepare`]: a fraction in
/// `[0, 1]` and a short label.
pub type PrepareProgress<'a> = &'a (dyn Fn(f32, &str) + Send + Sync);

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier, as used in config (`"openrouter"`, `"lmstudio"`).
    fn name(&self) -> &str;

    /// One-time readiness work before the first completion (credential
    /// checks, model availability). Reports progress as it goes.
    async fn prepare(&self, _model: &str, progress: PrepareProgress<'_>) -> Result<(), ProviderError> {
        progress(1.0, "Ready");
        Ok(())
    }

    /// Streams the response into `sender` chunk by chunk. Returns once the
    /// provider signals completion or the body ends.
    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError>;
}
