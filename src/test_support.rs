//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::config::{resolve, CliOverrides, TakahashiConfig};
use crate::core::state::App;
use crate::inference::{
    CompletionProvider, CompletionRequest, PrepareProgress, ProviderError, Source, StreamChunk,
};

/// What a [`ScriptedProvider`] was asked.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub directive: String,
    pub user: String,
    pub temperature: Option<f32>,
}

/// A provider that replays canned chunks instead of calling a model.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    content: Vec<String>,
    thinking: Vec<String>,
    prepare_error: Option<String>,
    stream_error: Option<ProviderError>,
    prepare_delay: Option<Duration>,
    stream_delay: Option<Duration>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedProvider {
    /// Streams `response` as a single content chunk.
    pub fn answering(response: &str) -> Self {
        Self::with_chunks(&[response])
    }

    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self {
            content: chunks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Out-of-band reasoning, streamed before the content.
    pub fn thinking(mut self, chunks: &[&str]) -> Self {
        self.thinking = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn failing_prepare(mut self, reason: &str) -> Self {
        self.prepare_error = Some(reason.to_string());
        self
    }

    pub fn failing_stream(mut self, error: ProviderError) -> Self {
        self.stream_error = Some(error);
        self
    }

    pub fn slow_prepare(mut self, delay: Duration) -> Self {
        self.prepare_delay = Some(delay);
        self
    }

    pub fn slow_stream(mut self, delay: Duration) -> Self {
        self.stream_delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn prepare(&self, _model: &str, progress: PrepareProgress<'_>) -> Result<(), ProviderError> {
        progress(0.5, "Warming up");
        if let Some(delay) = self.prepare_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.prepare_error {
            return Err(ProviderError::Config(reason.clone()));
        }
        progress(1.0, "Ready");
        Ok(())
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let text_of = |source: Source| {
            request
                .context
                .items
                .iter()
                .find(|seg| seg.source == source)
                .map(|seg| seg.content.clone())
                .unwrap_or_default()
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            directive: text_of(Source::Directive),
            user: text_of(Source::User),
            temperature: request.temperature,
        });

        if let Some(delay) = self.stream_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.stream_error {
            return Err(error.clone());
        }

        let chunks = self
            .thinking
            .iter()
            .map(|t| StreamChunk::Thinking(t.clone()))
            .chain(self.content.iter().map(|c| StreamChunk::Content(c.clone())));
        for chunk in chunks {
            sender
                .send(chunk)
                .await
                .map_err(|_| ProviderError::ChannelClosed)?;
        }
        Ok(())
    }
}

/// Creates a test App with default settings and a scripted provider.
pub fn test_app() -> App {
    let config = resolve(&TakahashiConfig::default(), &CliOverrides::default());
    App::new(&config, "scripted")
}
