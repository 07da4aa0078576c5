//! LM Studio, a local inference server (`/v1/responses`, no auth).
//!
//! Readiness is checked against the OpenAI-compatible `/v1/models` listing.
//! LM Studio loads a model on its first request, so an unlisted model only
//! earns a warning.

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use super::responses::{self, Role};
use crate::core::config::DEFAULT_LMSTUDIO_BASE_URL;
use crate::inference::{
    CompletionProvider, CompletionRequest, Context, Effort, PrepareProgress, ProviderError,
    StreamChunk,
};

#[derive(Serialize, Debug, Clone)]
struct InputMessage {
    role: Role,
    content: String,
}

#[derive(Serialize, Debug)]
struct Reasoning {
    effort: &'static str,
}

#[derive(Serialize, Debug)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<Reasoning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize, Debug)]
struct ModelEntry {
    id: String,
}

fn input_messages(context: &Context) -> Vec<InputMessage> {
    context
        .items
        .iter()
        .map(|item| InputMessage {
            role: item.source.into(),
            content: item.content.clone(),
        })
        .collect()
}

/// Local models take no "auto"; both Auto and None leave reasoning out.
fn reasoning_for(effort: Effort) -> Option<Reasoning> {
    let effort = match effort {
        Effort::High => "high",
        Effort::Medium => "medium",
        Effort::Low => "low",
        Effort::Auto | Effort::None => return None,
    };
    Some(Reasoning { effort })
}

pub struct LmStudioProvider {
    base_url: String,
    client: reqwest::Client,
}

impl LmStudioProvider {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .send()
            .await
            .map_err(|e| {
                ProviderError::Network(format!("LM Studio not reachable at {}: {e}", self.base_url))
            })?;
        let list: ModelList = responses::error_for_status(response, "LM Studio")
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl CompletionProvider for LmStudioProvider {
    fn name(&self) -> &str {
        "lmstudio"
    }

    async fn prepare(&self, model: &str, progress: PrepareProgress<'_>) -> Result<(), ProviderError> {
        progress(0.2, "Contacting LM Studio");
        let models = self.list_models().await?;
        progress(0.8, "Checking model");

        if models.iter().any(|id| id == model) {
            info!("LM Studio has {} available", model);
        } else {
            warn!(
                "Model {} not listed by LM Studio ({} models available)",
                model,
                models.len()
            );
        }
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
            reasoning: reasoning_for(request.effort),
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        };
        info!(
            "LM Studio request: model={}, messages={}, effort={:?}",
            request.model,
            body.input.len(),
            request.effort
        );

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let response = responses::error_for_status(response, "LM Studio").await?;

        responses::forward(response, &sender, "LM Studio").await
    }
}
