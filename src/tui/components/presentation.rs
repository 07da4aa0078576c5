//! # Presentation Component
//!
//! Full-screen slide show: nothing but the slide text, as large as fits, and
//! a thin progress line at the bottom.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │                                      │
//! │          高    橋    メ    ソ         │
//! │                                      │
//! │ 2/4 ━━━━━━━━━━━━━━━───────────────── │
//! └──────────────────────────────────────┘
//! ```
//!
//! Clicks on the right half advance, the left half goes back; the run loop
//! reports the click against the full frame width.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Clear, LineGauge};

use crate::core::presenter::Presenter;
use crate::tui::component::Component;
use crate::tui::components::big_text::{BigText, fit_current_slide};

pub struct Presentation<'a> {
    pub presenter: &'a mut Presenter,
}

impl Component for Presentation<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let [slide_area, progress_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

        if let Some(layout) = fit_current_slide(self.presenter, slide_area) {
            frame.render_widget(
                BigText {
                    layout: &layout,
                    style: Style::default().add_modifier(Modifier::BOLD),
                },
                slide_area,
            );
        }

        let ratio = (self.presenter.progress() / 100.0).clamp(0.0, 1.0);
        let gauge = LineGauge::default()
            .filled_style(Style::default().fg(Color::Cyan))
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .label(self.presenter.position_label())
            .ratio(ratio);
        frame.render_widget(gauge, progress_area);
    }
}
