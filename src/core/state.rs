//! # Application State
//!
//! Core business state for Takahashi. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── step: Step                    // which screen the user is on
//! ├── free_text: String             // last submitted prose (for retry)
//! ├── outline_text: String          // editable "- slide" outline
//! ├── reasoning: String             // model reasoning behind the outline
//! ├── live: Extracted               // streaming view while transforming
//! ├── presenter: Presenter          // deck + navigation + font fit
//! ├── engine: EngineState           // model readiness, mirrored from the session
//! ├── indent_mode: IndentMode       // outline grammar
//! ├── status_message: String        // status bar text
//! ├── model_name / provider_name    // shown in the title bar
//! ├── effort: Effort                // reasoning effort level
//! ├── is_loading: bool              // transform in flight
//! ├── transform_id: u64             // id of the latest transform request
//! ├── error: Option<String>         // error message, retryable with `r`
//! └── outline_path: Option<PathBuf> // where Ctrl+S saves
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::path::PathBuf;

use crate::core::config::ResolvedConfig;
use crate::core::document::DEFAULT_OUTLINE_FILE;
use crate::core::engine::EngineState;
use crate::core::outline::IndentMode;
use crate::core::presenter::Presenter;
use crate::core::tags::Extracted;
use crate::inference::Effort;

/// The screens of the free text → slides flow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Input,
    Transforming,
    Outline,
    Preview,
    Presenting,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::Input => "Text",
            Step::Transforming => "Transforming",
            Step::Outline => "Outline",
            Step::Preview => "Preview",
            Step::Presenting => "Presenting",
        }
    }
}

pub struct App {
    pub step: Step,
    pub free_text: String,
    pub outline_text: String,
    pub reasoning: String,
    pub live: Extracted,
    pub presenter: Presenter,
    pub engine: EngineState,
    pub indent_mode: IndentMode,
    pub status_message: String,
    pub model_name: String,
    pub provider_name: String,
    pub effort: Effort,
    pub is_loading: bool,
    pub transform_id: u64,
    pub error: Option<String>,
    pub outline_path: Option<PathBuf>,
}

impl App {
    pub fn new(config: &ResolvedConfig, provider_name: &str) -> Self {
        Self {
            step: Step::Input,
            free_text: String::new(),
            outline_text: String::new(),
            reasoning: String::new(),
            live: Extracted::default(),
            presenter: Presenter::new(config.fit, config.fit_strategy),
            engine: EngineState::Uninitialized,
            indent_mode: config.indent_mode,
            status_message: String::from("Paste or type your text, then press Ctrl+D"),
            model_name: config.model_name.clone(),
            provider_name: provider_name.to_string(),
            effort: config.effort,
            is_loading: false,
            transform_id: 0,
            error: None,
            outline_path: None,
        }
    }

    /// Starts on the outline step with an existing outline document.
    pub fn with_outline(mut self, path: PathBuf, text: Option<String>) -> Self {
        if let Some(text) = text {
            self.outline_text = text;
            self.step = Step::Outline;
            self.status_message = format!("Opened {}", path.display());
        }
        self.outline_path = Some(path);
        self
    }

    /// Where the outline is saved: the opened document, else `outline.txt`.
    pub fn save_path(&self) -> PathBuf {
        self.outline_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTLINE_FILE))
    }
}
