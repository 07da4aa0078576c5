//! Pure text wrapping utilities and dimensional constants for the TextEditor.
//!
//! These are stateless helpers with no dependency on TextEditor or CursorState.

use unicode_width::UnicodeWidthChar;

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Offset from area edge to content (border width)
pub(super) const BORDER_OFFSET: u16 = 1;

/// Build textwrap options configured for the editor inner width.
pub(super) fn wrap_options(inner_width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(inner_width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Calculate the inner content width after subtracting border/padding overhead.
/// Returns 0 if the area is too narrow.
pub(super) fn inner_width(content_width: u16) -> u16 {
    content_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Content lines that fit in an editor of the given outer height (at least one).
pub(super) fn visible_lines(area_height: u16) -> u16 {
    area_height.saturating_sub(VERTICAL_OVERHEAD).max(1)
}

/// Wrapped display lines, with the trailing empty line textwrap drops after a final newline.
pub(super) fn wrapped_lines(text: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines: Vec<String> = textwrap::wrap(text, wrap_options(width))
        .into_iter()
        .map(|line| line.into_owned())
        .collect();
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        lines.push(String::new());
    }
    lines
}

/// Count wrapped lines for the given text, accounting for trailing newlines
/// that textwrap may not represent as empty lines.
pub(super) fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    (wrapped_lines(text, width).len() as u16).max(1)
}

/// Byte range of each wrapped line within `text`.
///
/// Wrapped lines are verbatim slices of the text minus the spaces they broke
/// on, so the ranges are recovered by skipping those spaces (and the newline
/// ending a logical line) between consecutive lines.
pub(super) fn line_spans(text: &str, width: u16) -> Vec<(usize, usize)> {
    let lines = wrapped_lines(text, width);
    let mut spans = Vec::with_capacity(lines.len());
    let mut offset = 0;
    for line in &lines {
        let start = offset.min(text.len());
        let mut end = (start + line.len()).min(text.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        spans.push((start, end));

        let rest = &text[end..];
        let after_spaces = rest.trim_start_matches(' ');
        offset = end + (rest.len() - after_spaces.len());
        if after_spaces.starts_with('\n') {
            offset += 1;
        }
    }
    if spans.is_empty() {
        spans.push((0, 0));
    }
    spans
}

/// Byte offset into `line` of the last character starting within `columns` display columns.
pub(super) fn byte_at_column(line: &str, columns: usize) -> usize {
    let mut used = 0;
    for (i, c) in line.char_indices() {
        let w = c.width().unwrap_or(0);
        if used + w > columns {
            return i;
        }
        used += w;
    }
    line.len()
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}
