//! # Text Transformer
//!
//! Free text in, Takahashi-style outline out.
//!
//! ```text
//!  raw text ──► directive + user prompt ──► provider (streaming)
//!                                              │
//!                     on_progress(snapshot) ◄──┤ every chunk
//!                                              ▼
//!                                  trimmed, validated response
//! ```
//!
//! The whole call is bounded by a timeout, and the engine session must be
//! ready before anything is sent.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::core::engine::{EngineError, EngineSession};
use crate::core::{outline, tags};
use crate::inference::{
    CompletionProvider, CompletionRequest, Context, Effort, ProviderError, StreamChunk,
};

pub const TAKAHASHI_DIRECTIVE: &str = "\
You turn prose into slides for the Takahashi method: huge text, one idea per slide, fast pace.

Rules:
- One message per slide.
- At most 15 characters per slide. Shorter is better.
- Each slide is a single short phrase or a single word.
- Use as many slides as the content needs and keep the tempo brisk.
- No decoration: avoid symbols, emoji, markdown and punctuation where possible.
- Build a sequence that is punchy and understood at a glance.
- Write the slides in the same language as the input.
- Output each slide on its own line as \"- slide text\". Everything after \"- \" is shown on screen, so output nothing you do not want shown.

You may think first inside <reasoning>...</reasoning>. Then put only the slide lines inside <answer>...</answer>.

Example:
<answer>
- Takahashi method
- Huge text
- One slide
- One message
- Keep the tempo
- Easy to follow
- Never boring
- Big impact
- Easy to present
- Skip the details
- Simple
- Thank you
</answer>";

fn user_prompt(raw: &str) -> String {
    format!(
        "Input text:\n{raw}\n\nOutput:\nCreate a Takahashi-method slide outline that presents the input text."
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The engine session never became ready.
    NotReady(EngineError),
    /// The completion did not finish in time.
    Timeout(Duration),
    /// The model returned nothing.
    Empty,
    /// The answer has no `- text` line.
    Malformed,
    Provider(ProviderError),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::NotReady(e) => write!(f, "transform failed: {e}"),
            TransformError::Timeout(after) => {
                write!(f, "transform failed: no response within {}s", after.as_secs())
            }
            TransformError::Empty => write!(f, "transform failed: the model returned nothing"),
            TransformError::Malformed => write!(
                f,
                "transform failed: the response has no \"- \" slide lines"
            ),
            TransformError::Provider(e) => write!(f, "transform failed: {e}"),
        }
    }
}

impl std::error::Error for TransformError {}

/// Per-request knobs, normally taken from `ResolvedConfig`.
#[derive(Debug, Clone)]
pub struct TransformSettings {
    pub model: String,
    /// `None` uses [`TAKAHASHI_DIRECTIVE`].
    pub system_prompt: Option<String>,
    pub effort: Effort,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    pub ready_timeout: Duration,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            system_prompt: None,
            effort: Effort::default(),
            max_output_tokens: 4096,
            temperature: 0.7,
            timeout: Duration::from_secs(120),
            ready_timeout: Duration::from_secs(30),
        }
    }
}

pub struct Transformer {
    provider: Arc<dyn CompletionProvider>,
    session: Arc<EngineSession>,
    settings: TransformSettings,
}

impl Transformer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        session: Arc<EngineSession>,
        settings: TransformSettings,
    ) -> Self {
        Self {
            provider,
            session,
            settings,
        }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Runs one transformation. `on_progress` sees the growing response
    /// after every chunk; provider-side reasoning is folded in as a
    /// `<reasoning>` region.
    pub async fn transform<F>(&self, raw: &str, mut on_progress: F) -> Result<String, TransformError>
    where
        F: FnMut(&str) + Send,
    {
        self.session
            .wait_ready(self.settings.ready_timeout)
            .await
            .map_err(TransformError::NotReady)?;

        let directive = self
            .settings
            .system_prompt
            .as_deref()
            .unwrap_or(TAKAHASHI_DIRECTIVE);
        let mut context = Context::with_directive(directive);
        context.add_user_message(user_prompt(raw));

        let request = CompletionRequest {
            context: &context,
            model: &self.settings.model,
            effort: self.settings.effort,
            max_output_tokens: Some(self.settings.max_output_tokens),
            temperature: Some(self.settings.temperature),
        };

        info!(
            "Transform via {}: {} chars in, model={}",
            self.provider.name(),
            raw.chars().count(),
            self.settings.model
        );

        let (tx, mut rx) = mpsc::channel::<StreamChunk>(100);
        let stream = self.provider.stream_completion(request, tx);
        let collect = async {
            let mut content = String::new();
            let mut thinking = String::new();
            while let Some(chunk) = rx.recv().await {
                match chunk {
                    StreamChunk::Content(text) => content.push_str(&text),
                    StreamChunk::Thinking(text) => thinking.push_str(&text),
                }
                on_progress(&snapshot(&thinking, &content));
            }
            content
        };

        let (result, content) =
            tokio::time::timeout(self.settings.timeout, async { tokio::join!(stream, collect) })
                .await
                .map_err(|_| {
                    warn!("Transform timed out after {:?}", self.settings.timeout);
                    TransformError::Timeout(self.settings.timeout)
                })?;
        result.map_err(TransformError::Provider)?;

        let response = content.trim().to_string();
        debug!("Transform response: {} bytes", response.len());
        validate(&response)?;
        Ok(response)
    }
}

/// Combines out-of-band reasoning with the content stream for display.
fn snapshot(thinking: &str, content: &str) -> String {
    if thinking.is_empty() || content.contains("<reasoning>") {
        return content.to_string();
    }
    format!("<reasoning>{thinking}</reasoning>\n{content}")
}

fn validate(response: &str) -> Result<(), TransformError> {
    if response.is_empty() {
        return Err(TransformError::Empty);
    }
    // Same grammar the deck is parsed with
    if !outline::has_slide_marker(&tags::extract(response).answer) {
        warn!("Transform response has no outline lines");
        return Err(TransformError::Malformed);
    }
    Ok(())
}
