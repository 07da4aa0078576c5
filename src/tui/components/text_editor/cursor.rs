//! Cursor position tracking and navigation for the TextEditor.
//!
//! `CursorState` owns the cursor byte offset, scroll offset, and cached layout
//! size. All navigation methods accept `buffer: &str` explicitly; the text is
//! owned by `TextEditor`.

use super::text_wrap::{BORDER_OFFSET, byte_at_column, inner_width, line_spans};
use ratatui::layout::Rect;
use unicode_width::UnicodeWidthStr;

/// Cursor and scroll state, separated from the text buffer.
pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// Line offset for internal scrolling (0 when content fits in viewport)
    pub scroll_offset: u16,
    /// Cached content width from last render (used for cursor movement)
    pub last_content_width: u16,
    /// Cached number of visible content lines from last render
    pub last_visible_lines: u16,
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;
    const DEFAULT_VISIBLE_LINES: u16 = 5;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_content_width: Self::DEFAULT_WIDTH,
            last_visible_lines: Self::DEFAULT_VISIBLE_LINES,
        }
    }

    /// Index of the wrapped line holding the cursor, and that line's byte range.
    fn locate(&self, buffer: &str, content_width: u16) -> (usize, Vec<(usize, usize)>) {
        let spans = line_spans(buffer, inner_width(content_width));
        let index = spans
            .iter()
            .rposition(|&(start, _)| start <= self.pos)
            .unwrap_or(0);
        (index, spans)
    }

    /// Display columns between the start of the cursor's line and the cursor.
    fn column(&self, buffer: &str, line_start: usize) -> usize {
        buffer
            .get(line_start..self.pos)
            .map(UnicodeWidthStr::width)
            .unwrap_or(0)
    }

    /// Move cursor vertically (up or down) while trying to maintain column position.
    ///
    /// Returns `true` if cursor moved, `false` if already at boundary.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, content_width: u16) -> bool {
        if inner_width(content_width) == 0 || buffer.is_empty() {
            return false;
        }

        let (current, spans) = self.locate(buffer, content_width);
        let target = if direction < 0 {
            if current == 0 {
                return false;
            }
            current - 1
        } else {
            if current + 1 >= spans.len() {
                return false;
            }
            current + 1
        };

        let column = self.column(buffer, spans[current].0);
        let (start, end) = spans[target];
        self.pos = start + byte_at_column(&buffer[start..end], column);
        true
    }

    /// Calculate which wrapped line (0-based) the cursor is on.
    pub fn calculate_line(&self, buffer: &str, content_width: u16) -> u16 {
        if inner_width(content_width) == 0 {
            return 0;
        }
        self.locate(buffer, content_width).0 as u16
    }

    /// Update scroll offset to keep cursor visible within `visible` lines.
    pub fn update_scroll_offset(&mut self, buffer: &str, content_width: u16, visible: u16) {
        let total_lines = line_spans(buffer, inner_width(content_width)).len() as u16;
        if total_lines <= visible {
            self.scroll_offset = 0;
            return;
        }

        let cursor_line = self.calculate_line(buffer, content_width);
        if cursor_line < self.scroll_offset {
            self.scroll_offset = cursor_line;
        } else if cursor_line >= self.scroll_offset + visible {
            self.scroll_offset = cursor_line.saturating_sub(visible - 1);
        }
        self.scroll_offset = self.scroll_offset.min(total_lines - visible);
    }

    /// Calculate screen position for cursor based on wrapped text layout.
    /// Returns (column, row) in screen coordinates.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + BORDER_OFFSET, area.y + BORDER_OFFSET);
        }

        let (line, spans) = self.locate(buffer, area.width);
        let column = (self.column(buffer, spans[line].0) as u16).min(width);
        let visible_line = (line as u16).saturating_sub(self.scroll_offset);

        (
            area.x + BORDER_OFFSET + column,
            area.y + BORDER_OFFSET + visible_line,
        )
    }
}
