//! # Transform View
//!
//! What the user watches while their text is being turned into an outline:
//! the model's reasoning on the left, the outline as it streams in on the
//! right.
//!
//! ## Architecture
//!
//! `ReasoningPane` is a transient component (created each frame) that wraps
//! `&'a mut ReasoningState` (persistent scroll state) and the reasoning text.
//! It follows new text until the user scrolls up, and re-pins once they
//! scroll back to the bottom. The same pane sits next to the outline editor
//! after the transform finishes.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::tags::Extracted;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// Scroll state for the reasoning pane. Persisted in the parent TuiState.
pub struct ReasoningState {
    pub scroll_state: ScrollViewState,
    /// When true, follow new content
    pub stick_to_bottom: bool,
    /// Last known content and viewport heights (for clamping between frames)
    pub content_height: u16,
    pub viewport_height: u16,
}

impl Default for ReasoningState {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true,
            content_height: 0,
            viewport_height: 0,
        }
    }

    fn max_offset(&self) -> u16 {
        self.content_height.saturating_sub(self.viewport_height)
    }

    /// Re-engage following if the user has reached the bottom.
    fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        if self.scroll_state.offset().y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position { x: 0, y: max_y });
        }
    }
}

impl EventHandler for ReasoningState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::PageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::PageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

/// Scrollable, wrapped reasoning text inside a bordered block.
pub struct ReasoningPane<'a> {
    pub state: &'a mut ReasoningState,
    pub reasoning: &'a str,
}

impl Component for ReasoningPane<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title("Reasoning")
            .border_style(Style::default().add_modifier(Modifier::DIM));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let content_width = inner.width.saturating_sub(1); // -1 for scrollbar
        let text = if self.reasoning.is_empty() {
            "No reasoning yet"
        } else {
            self.reasoning
        };
        let paragraph = Paragraph::new(text)
            .style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
            .wrap(Wrap { trim: false });
        let content_height = paragraph.line_count(content_width) as u16;

        self.state.content_height = content_height;
        self.state.viewport_height = inner.height;
        let max_y = self.state.max_offset();
        if !self.state.stick_to_bottom && self.state.scroll_state.offset().y > max_y {
            self.state.scroll_state.set_offset(Position { x: 0, y: max_y });
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(paragraph, Rect::new(0, 0, content_width, content_height));

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll_state);
    }
}

/// The live view of a running transform.
pub struct TransformView<'a> {
    pub live: &'a Extracted,
    pub reasoning: &'a mut ReasoningState,
    pub spinner_frame: usize,
}

impl Component for TransformView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [status_area, panes_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
        let [reasoning_area, draft_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(panes_area);

        let status = Line::from(vec![
            Span::styled(spinner(self.spinner_frame), Style::default().fg(Color::Yellow)),
            Span::raw(" Writing the outline… "),
            Span::styled("Esc to cancel", Style::default().add_modifier(Modifier::DIM)),
        ]);
        frame.render_widget(status, status_area);

        ReasoningPane {
            state: &mut *self.reasoning,
            reasoning: &self.live.reasoning,
        }
        .render(frame, reasoning_area);

        let draft = Paragraph::new(self.live.answer.as_str())
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .title("Outline (draft)"),
            )
            .style(Style::default().fg(Color::Green))
            .wrap(Wrap { trim: false });
        frame.render_widget(draft, draft_area);
    }
}
