//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard and mouse events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//! crossterm ──► TuiEvent ──► route_event(step) ──► Action ──► update() ──► Effect
//!                                                    ▲                       │
//!              background tasks (engine, transform) ─┘        spawn / save / fullscreen
//! ```
//!
//! ## Redraw Strategy
//!
//! - **Animating** (transform running, model loading): draws every ~80ms so
//!   the spinner and progress keep moving.
//! - **Idle**: sleeps up to 500ms and only redraws on events or background
//!   actions.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::SetTitle;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::document;
use crate::core::engine::{EngineError, EngineSession, EngineState};
use crate::core::navigation::NavCommand;
use crate::core::state::{App, Step};
use crate::inference::{
    CompletionProvider, LmStudioProvider, OpenRouterProvider, TransformError, TransformSettings,
    Transformer,
};
use crate::tui::component::EventHandler;
use crate::tui::components::{EditorEvent, ReasoningState, TextEditor};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const WINDOW_TITLE: &str = "Takahashi";

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub input_editor: TextEditor,
    pub outline_editor: TextEditor,
    pub reasoning: ReasoningState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            input_editor: TextEditor::new(
                "Text",
                "Paste or type the text to turn into slides. Ctrl+D transforms it.",
            ),
            outline_editor: TextEditor::new(
                "Outline",
                "One slide per line, each starting with \"- \". Ctrl+D makes slides.",
            ),
            reasoning: ReasoningState::new(),
        }
    }

    /// Editors start with whatever the app already holds (an opened outline).
    pub fn for_app(app: &App) -> Self {
        let mut tui = Self::new();
        tui.outline_editor.set_text(&app.outline_text);
        tui
    }

    /// Brings the editors in line with the app after `update` moved it off `previous`.
    pub fn on_step_change(&mut self, previous: Step, app: &App) {
        if previous == app.step {
            return;
        }
        match app.step {
            // Coming back from the preview keeps the user's edits and cursor
            Step::Outline if previous != Step::Preview => {
                self.outline_editor.set_text(&app.outline_text);
            }
            Step::Input if previous == Step::Preview => {
                self.input_editor.set_text(&app.free_text);
            }
            Step::Transforming => self.reasoning = ReasoningState::new(),
            _ => {}
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Ctrl+Enter through; terminals without it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            SetTitle(WINDOW_TITLE),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Show
        );
    }
}

/// Held while a presentation is running; the window title tells which slide
/// deck is up and is restored when presenting ends.
struct PresentationGuard;

impl PresentationGuard {
    fn new(position: &str) -> std::io::Result<Self> {
        execute!(stdout(), SetTitle(format!("{WINDOW_TITLE} - presenting {position}")))?;
        info!("Entered full-screen presentation");
        Ok(Self)
    }
}

impl Drop for PresentationGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), SetTitle(WINDOW_TITLE));
        info!("Left full-screen presentation");
    }
}

/// Build a provider from a resolved config's provider name and credentials.
///
/// A missing OpenRouter key is not fatal here: the engine reports it when it
/// tries to get ready, and the user sees it in the title bar.
pub fn build_provider(config: &ResolvedConfig) -> Arc<dyn CompletionProvider> {
    match config.provider.as_str() {
        "lmstudio" => Arc::new(LmStudioProvider::new(Some(config.lmstudio_base_url.clone()))),
        other => {
            if other != "openrouter" {
                warn!("Unknown provider '{}', using openrouter", other);
            }
            let api_key = config.openrouter_api_key.clone().unwrap_or_else(|| {
                warn!("No OpenRouter API key (set OPENROUTER_API_KEY or use --provider lmstudio)");
                String::new()
            });
            Arc::new(OpenRouterProvider::new(
                api_key,
                Some(config.openrouter_base_url.clone()),
            ))
        }
    }
}

/// Everything the run loop needs to carry out effects.
struct Runtime {
    provider: Arc<dyn CompletionProvider>,
    session: Arc<EngineSession>,
    settings: TransformSettings,
    tx: mpsc::Sender<Action>,
    /// Abort handles for the running transform (used by Escape-to-cancel)
    abort_handles: Vec<tokio::task::AbortHandle>,
    presentation: Option<PresentationGuard>,
}

impl Runtime {
    fn cancel_transform(&mut self) {
        for handle in self.abort_handles.drain(..) {
            handle.abort();
        }
    }
}

pub fn run(config: ResolvedConfig, mut app: App) -> std::io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut runtime = Runtime {
        provider: build_provider(&config),
        session: Arc::new(EngineSession::new()),
        settings: config.transform_settings(),
        tx,
        abort_handles: Vec::new(),
        presentation: None,
    };
    let mut tui = TuiState::for_app(&app);

    spawn_engine_watch(&runtime.session, runtime.tx.clone());
    spawn_engine_init(&runtime);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'main: loop {
        let animating =
            app.is_loading || matches!(app.engine, EngineState::Initializing { .. });
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &mut app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        // Dynamic poll timeout: short when animating (~12fps), long when idle
        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let frame_width = terminal.get_frame().area().width;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&event, &app, &mut tui, frame_width)
                && dispatch(&mut app, &mut tui, &mut runtime, action)
            {
                break 'main;
            }
        }

        // Handle background task actions (engine state, transform progress)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, &mut runtime, action) {
                break 'main;
            }
        }
    }

    runtime.cancel_transform();
    drop(runtime.presentation.take());
    ratatui::restore();
    Ok(())
}

/// Applies one action and carries out its effect. Returns true to quit.
fn dispatch(app: &mut App, tui: &mut TuiState, runtime: &mut Runtime, action: Action) -> bool {
    if matches!(action, Action::CancelTransform) {
        runtime.cancel_transform();
    }

    let previous = app.step;
    let effect = update(app, action);
    tui.on_step_change(previous, app);

    match effect {
        Effect::None => false,
        Effect::Quit => true,
        Effect::SpawnTransform { id, raw } => {
            runtime.cancel_transform();
            let settings = TransformSettings {
                effort: app.effort,
                ..runtime.settings.clone()
            };
            runtime.abort_handles = spawn_transform(
                id,
                raw,
                runtime.provider.clone(),
                runtime.session.clone(),
                settings,
                runtime.tx.clone(),
            );
            false
        }
        Effect::EnterFullscreen => {
            match PresentationGuard::new(&app.presenter.position_label()) {
                Ok(guard) => runtime.presentation = Some(guard),
                Err(e) => warn!("Failed to enter full-screen mode: {}", e),
            }
            false
        }
        Effect::LeaveFullscreen => {
            runtime.presentation = None;
            false
        }
        Effect::SaveOutline { path, text } => {
            let result = document::save_outline(&path, &text)
                .map(|()| path)
                .map_err(|e| e.to_string());
            dispatch(app, tui, runtime, Action::OutlineSaved(result))
        }
    }
}

/// Turns a terminal event into an action, given the step the user is on.
/// Editing keys are consumed by the step's editor.
fn route_event(event: &TuiEvent, app: &App, tui: &mut TuiState, frame_width: u16) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        _ => {}
    }

    match app.step {
        Step::Input => {
            if app.error.is_some() {
                match event {
                    TuiEvent::InputChar('r') if !app.free_text.is_empty() => {
                        return Some(Action::Retry);
                    }
                    TuiEvent::Escape => return Some(Action::DismissError),
                    _ => {}
                }
            }
            match tui.input_editor.handle_event(event)? {
                EditorEvent::Submit(text) => Some(Action::SubmitText(text)),
                EditorEvent::CycleEffort => Some(Action::CycleEffort),
                EditorEvent::Save(_) | EditorEvent::ContentChanged => None,
            }
        }
        Step::Transforming => match event {
            TuiEvent::Escape => Some(Action::CancelTransform),
            TuiEvent::ScrollUp | TuiEvent::ScrollDown | TuiEvent::PageUp | TuiEvent::PageDown => {
                tui.reasoning.handle_event(event);
                None
            }
            _ => None,
        },
        Step::Outline => match event {
            TuiEvent::Escape if app.error.is_some() => Some(Action::DismissError),
            TuiEvent::Escape => Some(Action::BackToInput),
            TuiEvent::ScrollUp | TuiEvent::ScrollDown => {
                tui.reasoning.handle_event(event);
                None
            }
            _ => match tui.outline_editor.handle_event(event)? {
                EditorEvent::Submit(text) => Some(Action::GenerateSlides(text)),
                EditorEvent::Save(text) => Some(Action::SaveOutline(text)),
                EditorEvent::CycleEffort | EditorEvent::ContentChanged => None,
            },
        },
        Step::Preview => {
            if let Some(command) = nav_command(event) {
                return Some(Action::Navigate(command));
            }
            match event {
                TuiEvent::InputChar('p') | TuiEvent::Newline => Some(Action::StartPresentation),
                TuiEvent::InputChar('b') => Some(Action::BackToOutline),
                TuiEvent::InputChar('n') => Some(Action::NewText),
                TuiEvent::InputChar('q') => Some(Action::Quit),
                TuiEvent::Escape if app.error.is_some() => Some(Action::DismissError),
                TuiEvent::Escape => Some(Action::BackToOutline),
                _ => None,
            }
        }
        Step::Presenting => {
            if let Some(command) = nav_command(event) {
                return Some(Action::Navigate(command));
            }
            match event {
                TuiEvent::MouseClick(x, _) => Some(Action::Pointer {
                    x: *x,
                    left: 0,
                    width: frame_width,
                }),
                TuiEvent::Escape | TuiEvent::InputChar('q') => {
                    Some(Action::FullscreenChanged(false))
                }
                _ => None,
            }
        }
    }
}

/// Slide navigation keys, shared by the preview and the presentation.
fn nav_command(event: &TuiEvent) -> Option<NavCommand> {
    match event {
        TuiEvent::CursorRight
        | TuiEvent::CursorDown
        | TuiEvent::PageDown
        | TuiEvent::ScrollDown
        | TuiEvent::InputChar(' ' | 'l' | 'j') => Some(NavCommand::Advance),
        TuiEvent::CursorLeft
        | TuiEvent::CursorUp
        | TuiEvent::PageUp
        | TuiEvent::ScrollUp
        | TuiEvent::Backspace
        | TuiEvent::InputChar('h' | 'k') => Some(NavCommand::Retreat),
        TuiEvent::CursorHome => Some(NavCommand::First),
        TuiEvent::CursorEnd => Some(NavCommand::Last),
        _ => None,
    }
}

/// Mirrors every engine state change into the action channel.
fn spawn_engine_watch(session: &EngineSession, tx: mpsc::Sender<Action>) {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        loop {
            let state = rx.borrow_and_update().clone();
            if tx.send(Action::EngineChanged(state)).is_err() {
                debug!("Engine watch stopped: receiver dropped");
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    });
}

/// Starts getting the model ready in the background as soon as the app opens.
fn spawn_engine_init(runtime: &Runtime) {
    let provider = runtime.provider.clone();
    let session = runtime.session.clone();
    let model = runtime.settings.model.clone();
    tokio::spawn(async move {
        // Failures land in the session state; the title bar shows them
        let _ = session.initialize(provider.as_ref(), &model).await;
    });
}

fn spawn_transform(
    id: u64,
    raw: String,
    provider: Arc<dyn CompletionProvider>,
    session: Arc<EngineSession>,
    settings: TransformSettings,
    tx: mpsc::Sender<Action>,
) -> Vec<tokio::task::AbortHandle> {
    info!(
        "Spawning transform {} ({} chars, effort {:?})",
        id,
        raw.chars().count(),
        settings.effort
    );

    let handle = tokio::spawn(async move {
        // A failed engine gets another try before giving up on this transform
        if !session.is_ready() {
            match session.initialize(provider.as_ref(), &settings.model).await {
                Ok(()) | Err(EngineError::AlreadyInitializing) => {}
                Err(e) => {
                    let _ = tx.send(Action::TransformFinished {
                        id,
                        result: Err(TransformError::NotReady(e)),
                    });
                    return;
                }
            }
        }

        let transformer = Transformer::new(provider, session, settings);
        let progress_tx = tx.clone();
        let result = transformer
            .transform(&raw, move |snapshot| {
                if progress_tx
                    .send(Action::TransformProgress {
                        id,
                        snapshot: snapshot.to_string(),
                    })
                    .is_err()
                {
                    debug!("Dropping transform progress: receiver gone");
                }
            })
            .await;

        if tx.send(Action::TransformFinished { id, result }).is_err() {
            warn!("Failed to send transform result: receiver dropped");
        }
    });

    vec![handle.abort_handle()]
}
