//! # Actions
//!
//! Everything that can happen in Takahashi becomes an `Action`.
//! User presses Ctrl+D on their prose? That's `Action::SubmitText`.
//! The model streams a chunk? That's `Action::TransformProgress { id, snapshot }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing any I/O the adapter must
//! perform. No side effects here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! ```text
//!  Input ──submit──► Transforming ──done──► Outline ──generate──► Preview ──p──► Presenting
//!    ▲                   │  esc / error        ▲ b                  ▲  exit fullscreen  │
//!    └───────────────────┘                     └────────────────────┘◄─────────────────┘
//! ```

use std::path::PathBuf;

use log::{info, warn};

use crate::core::engine::EngineState;
use crate::core::navigation::NavCommand;
use crate::core::outline;
use crate::core::state::{App, Step};
use crate::core::tags;
use crate::inference::TransformError;

#[derive(Debug)]
pub enum Action {
    /// Free text submitted for transformation.
    SubmitText(String),
    /// The streamed response so far. `id` names the request it belongs to.
    TransformProgress { id: u64, snapshot: String },
    TransformFinished {
        id: u64,
        result: Result<String, TransformError>,
    },
    CancelTransform,
    /// Re-run the last transform after an error.
    Retry,
    DismissError,
    /// Parse the given outline into a deck and preview it.
    GenerateSlides(String),
    Navigate(NavCommand),
    /// A click on the presentation surface, in terminal columns.
    Pointer { x: u16, left: u16, width: u16 },
    StartPresentation,
    /// The full-screen surface reports whether it is still active.
    FullscreenChanged(bool),
    BackToOutline,
    BackToInput,
    NewText,
    CycleEffort,
    SaveOutline(String),
    OutlineSaved(Result<PathBuf, String>),
    EngineChanged(EngineState),
    Quit,
}

/// I/O the adapter performs after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Start transform request `id` on `raw`.
    SpawnTransform { id: u64, raw: String },
    EnterFullscreen,
    LeaveFullscreen,
    SaveOutline { path: PathBuf, text: String },
    Quit,
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::SubmitText(text) => {
            let text = text.trim();
            if text.is_empty() {
                app.status_message = "Nothing to transform yet".to_string();
                return Effect::None;
            }
            if app.is_loading {
                return Effect::None;
            }
            app.free_text = text.to_string();
            start_transform(app)
        }
        Action::TransformProgress { id, snapshot } => {
            if app.is_loading && id == app.transform_id {
                app.live = tags::extract_partial(&snapshot);
            }
            Effect::None
        }
        Action::TransformFinished { id, result } => {
            // A cancelled or superseded transform may still report in
            if id != app.transform_id {
                info!("Dropping result of stale transform {}", id);
                return Effect::None;
            }
            if !app.is_loading {
                return Effect::None;
            }
            app.is_loading = false;
            match result {
                Ok(response) => {
                    let extracted = tags::extract(&response);
                    info!(
                        "Transform produced {} outline bytes",
                        extracted.answer.len()
                    );
                    app.outline_text = extracted.answer;
                    app.reasoning = extracted.reasoning;
                    app.step = Step::Outline;
                    app.status_message =
                        "Edit the outline, then press Ctrl+D to make slides".to_string();
                }
                Err(e) => {
                    warn!("Transform failed: {}", e);
                    app.error = Some(e.to_string());
                    app.step = Step::Input;
                    app.status_message = "Press r to retry or Esc to dismiss".to_string();
                }
            }
            Effect::None
        }
        Action::CancelTransform => {
            if app.is_loading {
                app.is_loading = false;
                app.step = Step::Input;
                app.status_message = "Transform cancelled".to_string();
            }
            Effect::None
        }
        Action::Retry => {
            if app.error.is_none() || app.free_text.is_empty() || app.is_loading {
                return Effect::None;
            }
            start_transform(app)
        }
        Action::DismissError => {
            app.error = None;
            Effect::None
        }
        Action::GenerateSlides(text) => {
            let deck = outline::parse_with(&text, app.indent_mode);
            app.outline_text = text;
            if deck.is_empty() {
                app.status_message = "No slides found: start each slide line with \"- \"".to_string();
                return Effect::None;
            }
            app.status_message = format!("{} slides", deck.len());
            app.presenter.load(deck);
            app.step = Step::Preview;
            Effect::None
        }
        Action::Navigate(command) => {
            if matches!(app.step, Step::Preview | Step::Presenting) {
                app.presenter.apply(command);
            }
            Effect::None
        }
        Action::Pointer { x, left, width } => {
            if app.step == Step::Presenting {
                app.presenter
                    .pointer(f32::from(x), f32::from(left), f32::from(width));
            }
            Effect::None
        }
        Action::StartPresentation => {
            if app.step != Step::Preview {
                return Effect::None;
            }
            if !app.presenter.enter_presentation() {
                app.status_message = "No slides to present".to_string();
                return Effect::None;
            }
            app.step = Step::Presenting;
            Effect::EnterFullscreen
        }
        Action::FullscreenChanged(active) => {
            if app.presenter.on_fullscreen_change(active) {
                app.step = Step::Preview;
                app.status_message = format!("Stopped at slide {}", app.presenter.position_label());
                return Effect::LeaveFullscreen;
            }
            Effect::None
        }
        Action::BackToOutline => {
            if app.step == Step::Preview {
                app.step = Step::Outline;
            }
            Effect::None
        }
        Action::BackToInput => {
            if app.step == Step::Outline {
                app.step = Step::Input;
            }
            Effect::None
        }
        Action::NewText => {
            if app.step == Step::Preview {
                app.free_text.clear();
                app.outline_text.clear();
                app.reasoning.clear();
                app.error = None;
                app.step = Step::Input;
                app.status_message = "Paste or type your text, then press Ctrl+D".to_string();
            }
            Effect::None
        }
        Action::CycleEffort => {
            app.effort = app.effort.next();
            app.status_message = format!("Reasoning: {}", app.effort.label());
            Effect::None
        }
        Action::SaveOutline(text) => {
            app.outline_text = text.clone();
            Effect::SaveOutline {
                path: app.save_path(),
                text,
            }
        }
        Action::OutlineSaved(result) => {
            match result {
                Ok(path) => {
                    app.status_message = format!("Saved {}", path.display());
                    app.outline_path = Some(path);
                }
                Err(message) => app.error = Some(message),
            }
            Effect::None
        }
        Action::EngineChanged(state) => {
            if let EngineState::Failed(reason) = &state {
                warn!("Engine failed: {}", reason);
            }
            app.engine = state;
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn start_transform(app: &mut App) -> Effect {
    app.error = None;
    app.is_loading = true;
    app.transform_id += 1;
    app.live = Default::default();
    app.step = Step::Transforming;
    app.status_message = "Transforming… Esc to cancel".to_string();
    Effect::SpawnTransform {
        id: app.transform_id,
        raw: app.free_text.clone(),
    }
}
