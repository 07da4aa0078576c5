//! # TitleBar Component
//!
//! Top status bar: which step of the flow the user is on, the model, whether
//! the model is ready, and the latest status message.
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives all data as props and has no
//! internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new("Outline", "gemma-3", "Model ready", "3 slides");
//! title_bar.render(frame, area);
//! ```
//!
//! ## Conditional Formatting
//!
//! 1. **Status message**: `"Takahashi [Outline] (model: gemma-3, Model ready) | 3 slides"`
//! 2. **Default**: `"Takahashi [Outline] (model: gemma-3, Model ready)"`
//!
//! The engine part is yellow while loading and red once it has failed.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// How the engine status is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineTone {
    Ready,
    Busy,
    Failed,
}

pub struct TitleBar {
    pub step_label: String,
    pub model_name: String,
    pub engine_status: String,
    pub engine_tone: EngineTone,
    pub status_message: String,
}

impl TitleBar {
    pub fn new(
        step_label: impl Into<String>,
        model_name: impl Into<String>,
        engine_status: impl Into<String>,
        status_message: impl Into<String>,
    ) -> Self {
        Self {
            step_label: step_label.into(),
            model_name: model_name.into(),
            engine_status: engine_status.into(),
            engine_tone: EngineTone::Ready,
            status_message: status_message.into(),
        }
    }

    pub fn tone(mut self, tone: EngineTone) -> Self {
        self.engine_tone = tone;
        self
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let engine_style = match self.engine_tone {
            EngineTone::Ready => Style::default().fg(Color::Green),
            EngineTone::Busy => Style::default().fg(Color::Yellow),
            EngineTone::Failed => Style::default().fg(Color::Red),
        };

        let mut spans = vec![
            Span::styled("Takahashi", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" [{}] (model: {}, ", self.step_label, self.model_name)),
            Span::styled(self.engine_status.clone(), engine_style),
            Span::raw(")"),
        ];
        if !self.status_message.is_empty() {
            spans.push(Span::raw(format!(" | {}", self.status_message)));
        }

        frame.render_widget(Line::from(spans), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_title_bar_with_status_message() {
        let mut title_bar = TitleBar::new("Outline", "gemma-3", "Model ready", "3 slides");
        let text = rendered(&mut title_bar);

        assert!(text.contains("Takahashi [Outline]"));
        assert!(text.contains("model: gemma-3, Model ready"));
        assert!(text.contains("| 3 slides"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new("Text", "gemma-3", "Model not loaded", "");
        let text = rendered(&mut title_bar);

        assert!(text.contains("Takahashi [Text]"));
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_failed_engine_is_red() {
        let backend = TestBackend::new(100, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut title_bar =
            TitleBar::new("Text", "m", "Model failed: no key", "").tone(EngineTone::Failed);
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let start = "Takahashi [Text] (model: m, ".len() as u16;
        assert_eq!(buffer[(start, 0)].symbol(), "M");
        assert_eq!(buffer[(start, 0)].fg, Color::Red);
    }
}
