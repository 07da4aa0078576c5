//! # TextEditor Component
//!
//! A multi-line editor used twice: once for the free text the user wants
//! turned into slides, once for the generated outline.
//!
//! ## Responsibilities
//!
//! - Capture text input (Enter inserts a newline)
//! - Handle editing (backspace, delete, cursor movement, paste)
//! - Emit Submit (Ctrl+D), Save (Ctrl+S) and CycleEffort (Ctrl+R)
//! - Scroll internally when the text is taller than the area
//!
//! ## State Management
//!
//! The buffer is internal state. Title, placeholder and effort are props.
//! Cursor position and scroll state are encapsulated in `CursorState`.
//! Submitting does not clear the buffer, so a failed transform can be
//! edited and sent again.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::inference::Effort;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::CursorState;
use text_wrap::{
    inner_width, next_char_boundary, prev_char_boundary, visible_lines, wrap_line_count,
    wrapped_lines,
};

/// High-level events emitted by the TextEditor
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// User submitted the text (Ctrl+D)
    Submit(String),
    /// User asked to save the text (Ctrl+S)
    Save(String),
    /// User requested to cycle effort level (Ctrl+R)
    CycleEffort,
    ContentChanged,
}

/// Multi-line text editor.
///
/// # Props
///
/// - `title`: Block title
/// - `placeholder`: Shown dimmed while the buffer is empty
/// - `effort`: Reasoning effort shown in the title, if any
pub struct TextEditor {
    pub title: String,
    pub placeholder: String,
    pub effort: Option<Effort>,
    buffer: String,
    cursor: CursorState,
}

impl TextEditor {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            placeholder: placeholder.into(),
            effort: None,
            buffer: String::new(),
            cursor: CursorState::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replaces the content and puts the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor.pos = self.buffer.len();
        self.cursor.scroll_offset = 0;
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    fn title_line(&self) -> String {
        match self.effort {
            Some(effort) => format!("{} (Reasoning: {})", self.title, effort.label()),
            None => self.title.clone(),
        }
    }

    /// Wrapped lines currently scrolled into view.
    fn visible_text(&self, content_width: u16, visible: u16) -> String {
        let width = inner_width(content_width);
        let lines = wrapped_lines(&self.buffer, width);
        let start = (self.cursor.scroll_offset as usize).min(lines.len());
        let end = (start + visible as usize).min(lines.len());
        lines[start..end].join("\n")
    }

    /// Render scrollbar when content exceeds visible area
    fn render_scrollbar(&self, frame: &mut Frame, area: Rect, visible: u16) {
        use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

        let total_lines = wrap_line_count(&self.buffer, inner_width(area.width));
        if total_lines <= visible {
            return;
        }

        // ScrollbarState content_length is max scrollable position, not total items
        let max_scroll = total_lines.saturating_sub(visible);
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(max_scroll as usize)
            .position(self.cursor.scroll_offset as usize);

        let scrollbar_area = Rect {
            x: area.x + area.width.saturating_sub(1),
            y: area.y + 1,
            width: 1,
            height: area.height.saturating_sub(2),
        };

        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

impl Component for TextEditor {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let visible = visible_lines(area.height);
        self.cursor.last_content_width = area.width;
        self.cursor.last_visible_lines = visible;
        self.cursor
            .update_scroll_offset(&self.buffer, area.width, visible);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title_line());

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(self.placeholder.as_str()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(self.visible_text(area.width, visible))
                .style(Style::default().fg(Color::Green))
        };
        frame.render_widget(paragraph.block(block), area);
        self.render_scrollbar(frame, area, visible);

        frame.set_cursor_position(self.cursor.screen_pos(&self.buffer, area));
    }
}

impl EventHandler for TextEditor {
    type Event = EditorEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor.pos, *c);
                self.cursor.pos += c.len_utf8();
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Newline => {
                self.buffer.insert(self.cursor.pos, '\n');
                self.cursor.pos += 1;
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Terminals deliver pasted line breaks as CR
                let text = text.replace("\r\n", "\n").replace('\r', "\n");
                self.buffer.insert_str(self.cursor.pos, &text);
                self.cursor.pos += text.len();
                Some(EditorEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor.pos > 0 {
                    let prev = prev_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(prev..self.cursor.pos);
                    self.cursor.pos = prev;
                    Some(EditorEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor.pos < self.buffer.len() {
                    let next = next_char_boundary(&self.buffer, self.cursor.pos);
                    self.buffer.drain(self.cursor.pos..next);
                    Some(EditorEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => (self.cursor.pos > 0).then(|| {
                self.cursor.pos = prev_char_boundary(&self.buffer, self.cursor.pos);
                EditorEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor.pos < self.buffer.len()).then(|| {
                self.cursor.pos = next_char_boundary(&self.buffer, self.cursor.pos);
                EditorEvent::ContentChanged
            }),
            TuiEvent::CursorHome => {
                let line_start = self.buffer[..self.cursor.pos]
                    .rfind('\n')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                (self.cursor.pos != line_start).then(|| {
                    self.cursor.pos = line_start;
                    EditorEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = self.buffer[self.cursor.pos..]
                    .find('\n')
                    .map(|i| self.cursor.pos + i)
                    .unwrap_or(self.buffer.len());
                (self.cursor.pos != line_end).then(|| {
                    self.cursor.pos = line_end;
                    EditorEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => self
                .cursor
                .move_vertically(&self.buffer, -1, self.cursor.last_content_width)
                .then_some(EditorEvent::ContentChanged),
            TuiEvent::CursorDown => self
                .cursor
                .move_vertically(&self.buffer, 1, self.cursor.last_content_width)
                .then_some(EditorEvent::ContentChanged),
            TuiEvent::PageUp | TuiEvent::PageDown => {
                let direction = if *event == TuiEvent::PageUp { -1 } else { 1 };
                let mut moved = false;
                for _ in 0..self.cursor.last_visible_lines {
                    if !self.cursor.move_vertically(
                        &self.buffer,
                        direction,
                        self.cursor.last_content_width,
                    ) {
                        break;
                    }
                    moved = true;
                }
                moved.then_some(EditorEvent::ContentChanged)
            }
            TuiEvent::Submit => (!self.buffer.trim().is_empty())
                .then(|| EditorEvent::Submit(self.buffer.clone())),
            TuiEvent::Save => Some(EditorEvent::Save(self.buffer.clone())),
            TuiEvent::CycleEffort => self.effort.is_some().then_some(EditorEvent::CycleEffort),
            _ => None,
        }
    }
}
