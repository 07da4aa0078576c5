use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::core::engine::EngineState;
use crate::core::state::{App, Step};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    EngineTone, Presentation, ReasoningPane, SlidePreview, TitleBar, TransformView,
};

/// Height of the error banner, borders included.
const ERROR_HEIGHT: u16 = 4;

pub fn draw_ui(frame: &mut Frame, app: &mut App, tui: &mut TuiState, spinner_frame: usize) {
    if app.step == Step::Presenting {
        Presentation {
            presenter: &mut app.presenter,
        }
        .render(frame, frame.area());
        return;
    }

    use Constraint::{Length, Min};
    let error_height = if app.error.is_some() { ERROR_HEIGHT } else { 0 };
    let [title_area, main_area, error_area] =
        Layout::vertical([Length(1), Min(0), Length(error_height)]).areas(frame.area());

    let tone = match &app.engine {
        EngineState::Ready => EngineTone::Ready,
        EngineState::Failed(_) => EngineTone::Failed,
        EngineState::Uninitialized | EngineState::Initializing { .. } => EngineTone::Busy,
    };
    TitleBar::new(
        app.step.label(),
        app.model_name.as_str(),
        app.engine.describe(),
        app.status_message.as_str(),
    )
    .tone(tone)
    .render(frame, title_area);

    match app.step {
        Step::Input => {
            tui.input_editor.effort = Some(app.effort);
            tui.input_editor.render(frame, main_area);
        }
        Step::Transforming => {
            TransformView {
                live: &app.live,
                reasoning: &mut tui.reasoning,
                spinner_frame,
            }
            .render(frame, main_area);
        }
        Step::Outline => draw_outline(frame, main_area, app, tui),
        Step::Preview => {
            SlidePreview {
                presenter: &mut app.presenter,
            }
            .render(frame, main_area);
        }
        Step::Presenting => {}
    }

    if let Some(error) = &app.error {
        draw_error_banner(frame, error_area, error, can_retry(app));
    }
}

fn draw_outline(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    if app.reasoning.is_empty() {
        tui.outline_editor.render(frame, area);
        return;
    }
    let [editor_area, reasoning_area] =
        Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
    tui.outline_editor.render(frame, editor_area);
    ReasoningPane {
        state: &mut tui.reasoning,
        reasoning: &app.reasoning,
    }
    .render(frame, reasoning_area);
}

fn can_retry(app: &App) -> bool {
    app.step == Step::Input && !app.free_text.is_empty()
}

fn draw_error_banner(frame: &mut Frame, area: Rect, error: &str, retryable: bool) {
    let hint = if retryable {
        "r retry · Esc dismiss"
    } else {
        "Esc dismiss"
    };
    let banner = Paragraph::new(Line::from(vec![
        Span::styled(error, Style::default().fg(Color::Red)),
        Span::styled(format!("  ({hint})"), Style::default().add_modifier(Modifier::DIM)),
    ]))
    .block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title("Error"),
    )
    .wrap(Wrap { trim: true });
    frame.render_widget(banner, area);
}
