//! # Big Text
//!
//! Slide text in a terminal. A font size `s` becomes an integer scale: each
//! glyph gets a cell `s` times its display width across and `ceil(s / 2)`
//! rows down (terminal cells are about twice as tall as wide), with the glyph
//! centred in its cell.
//!
//! ```text
//! scale 1:  高橋        scale 3:  高    橋
//!                                  (2 rows per line)
//! ```
//!
//! [`CellMeasurer`] reports the box the layout would occupy, so the font
//! fitter can binary-search the scale against the real terminal area.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::fit::{Extent, TextMeasurer};
use crate::core::presenter::Presenter;

/// Wrapped slide text at one scale.
#[derive(Debug, Clone, PartialEq)]
pub struct BigTextLayout {
    lines: Vec<String>,
    scale: u16,
}

impl BigTextLayout {
    /// Lays out `text` at `size`, wrapping so no line is wider than `wrap_width` columns.
    pub fn new(text: &str, size: f32, wrap_width: f32) -> Self {
        let scale = size.floor().max(1.0) as u16;
        let columns = ((wrap_width / f32::from(scale)).floor() as usize).max(1);
        let options = textwrap::Options::new(columns)
            .break_words(true)
            .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit);

        let lines = if text.trim().is_empty() {
            Vec::new()
        } else {
            textwrap::wrap(text.trim(), options)
                .into_iter()
                .map(|line| line.into_owned())
                .collect()
        };
        Self { lines, scale }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn scale(&self) -> u16 {
        self.scale
    }

    /// Rows per line of text.
    pub fn line_height(&self) -> u16 {
        self.scale.div_ceil(2)
    }

    pub fn width(&self) -> u16 {
        self.lines
            .iter()
            .map(|line| line.width() as u16)
            .max()
            .unwrap_or(0)
            .saturating_mul(self.scale)
    }

    pub fn height(&self) -> u16 {
        (self.lines.len() as u16).saturating_mul(self.line_height())
    }
}

/// Measures slide text in terminal cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasurer;

impl TextMeasurer for CellMeasurer {
    fn measure(&self, text: &str, size: f32, wrap_width: f32) -> Extent {
        let layout = BigTextLayout::new(text, size, wrap_width);
        Extent::new(f32::from(layout.width()), f32::from(layout.height()))
    }
}

/// Fits the current slide into `area` and lays it out at the chosen size.
pub fn fit_current_slide(presenter: &mut Presenter, area: Rect) -> Option<BigTextLayout> {
    let container = Extent::new(f32::from(area.width), f32::from(area.height));
    let size = presenter.font_size(container, &CellMeasurer);
    let wrap_width = container.width * presenter.fitter().config().margin;
    presenter
        .current_slide()
        .map(|slide| BigTextLayout::new(&slide.text, size, wrap_width))
}

/// Draws a [`BigTextLayout`] centred in its area. Glyphs outside the area are clipped.
pub struct BigText<'a> {
    pub layout: &'a BigTextLayout,
    pub style: Style,
}

impl Widget for BigText<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let scale = self.layout.scale();
        let line_height = self.layout.line_height();
        let top = area.y + area.height.saturating_sub(self.layout.height()) / 2;
        let glyph_row = (line_height - 1) / 2;

        for (row, line) in self.layout.lines().iter().enumerate() {
            let y = top + row as u16 * line_height + glyph_row;
            if y >= area.bottom() {
                break;
            }
            let line_width = (line.width() as u16).saturating_mul(scale);
            let mut x = area.x + area.width.saturating_sub(line_width) / 2;

            for c in line.chars() {
                let glyph_width = c.width().unwrap_or(0) as u16;
                if glyph_width == 0 {
                    continue;
                }
                let cell_width = glyph_width * scale;
                let glyph_x = x + (cell_width - glyph_width) / 2;
                if glyph_x + glyph_width > area.right() {
                    break;
                }
                buf.set_string(glyph_x, y, c.to_string(), self.style);
                x += cell_width;
            }
        }
    }
}
