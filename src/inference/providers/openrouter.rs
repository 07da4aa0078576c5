//! OpenRouter over the Responses API (`POST {base}/responses`, bearer auth).
//!
//! OpenRouter keeps no conversation state, so the directive and the text go
//! out in full with every transform.

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use tokio::sync::mpsc::Sender;

use super::responses::{self, Role};
use crate::core::config::DEFAULT_OPENROUTER_BASE_URL;
use crate::inference::{
    CompletionProvider, CompletionRequest, Context, Effort, PrepareProgress, ProviderError,
    StreamChunk,
};

#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename = "message")]
struct InputMessage {
    role: Role,
    content: String,
}

/// OpenRouter takes either an explicit effort or `enabled: true` to let the
/// model decide.
#[derive(Serialize, Debug, PartialEq)]
struct Reasoning {
    #[serde(skip_serializing_if = "Option::is_none")]
    effort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
}

impl From<Effort> for Reasoning {
    fn from(effort: Effort) -> Self {
        let level = match effort {
            Effort::Auto => {
                return Reasoning {
                    effort: None,
                    enabled: Some(true),
                };
            }
            Effort::High => "high",
            Effort::Medium => "medium",
            Effort::Low => "low",
            Effort::None => "none",
        };
        Reasoning {
            effort: Some(level),
            enabled: None,
        }
    }
}

#[derive(Serialize, Debug)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage>,
    stream: bool,
    reasoning: Reasoning,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

fn input_messages(context: &Context) -> Vec<InputMessage> {
    context
        .items
        .iter()
        .map(|seg| InputMessage {
            role: seg.source.into(),
            content: seg.content.clone(),
        })
        .collect()
}

pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// `base_url` defaults to the public OpenRouter API.
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    /// Nothing to load remotely; readiness is just having a key.
    async fn prepare(&self, model: &str, progress: PrepareProgress<'_>) -> Result<(), ProviderError> {
        progress(0.5, "Checking OpenRouter credentials");
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::Config(
                "OPENROUTER_API_KEY is not set".to_string(),
            ));
        }
        info!("OpenRouter ready for model {}", model);
        progress(1.0, "Ready");
        Ok(())
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        let body = ResponsesRequest {
            model: request.model,
            input: input_messages(request.context),
            stream: true,
            reasoning: request.effort.into(),
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };
        info!(
            "OpenRouter request: model={}, messages={}, effort={:?}",
            request.model,
            body.input.len(),
            request.effort,
        );
        let json_body = serde_json::to_string(&body)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Raw OpenRouter request: {}", json_body);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = responses::error_for_status(response, "OpenRouter").await?;

        responses::forward(response, &sender, "OpenRouter").await
    }
}
