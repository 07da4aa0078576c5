//! # SlidePreview Component
//!
//! The deck as a card: the current slide at its fitted size, any speaker
//! memos underneath, and the key hints.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph, Wrap};

use crate::core::presenter::Presenter;
use crate::tui::component::Component;
use crate::tui::components::big_text::{BigText, fit_current_slide};

const HINTS: &str = "←/→ slide · Home/End · p present · b edit outline · n new text";

pub struct SlidePreview<'a> {
    pub presenter: &'a mut Presenter,
}

impl Component for SlidePreview<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let memos: Vec<Line> = self
            .presenter
            .current_slide()
            .map(|slide| {
                slide
                    .memos
                    .iter()
                    .map(|memo| Line::from(format!("• {memo}")))
                    .collect()
            })
            .unwrap_or_default();
        let memo_height = if memos.is_empty() {
            0
        } else {
            (memos.len() as u16 + 2).min(area.height / 3)
        };

        let [card_area, memo_area, hint_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(memo_height),
            Constraint::Length(1),
        ])
        .areas(area);

        let mut title = vec![Span::raw(format!(
            " Slide {} ",
            self.presenter.position_label()
        ))];
        let card = Block::bordered().border_type(BorderType::Thick);
        let inner = card.inner(card_area);
        let layout = fit_current_slide(self.presenter, inner);
        if self.presenter.fitter().is_overflowing() {
            title.push(Span::styled(
                "text too long ",
                Style::default().fg(Color::Red),
            ));
        }
        frame.render_widget(card.title(Line::from(title)), card_area);
        if let Some(layout) = &layout {
            frame.render_widget(
                BigText {
                    layout,
                    style: Style::default().add_modifier(Modifier::BOLD),
                },
                inner,
            );
        }

        if memo_height > 0 {
            let notes = Paragraph::new(memos)
                .block(
                    Block::bordered()
                        .border_type(BorderType::Rounded)
                        .title("Memo"),
                )
                .wrap(Wrap { trim: true });
            frame.render_widget(notes, memo_area);
        }

        frame.render_widget(
            Span::styled(HINTS, Style::default().add_modifier(Modifier::DIM)),
            hint_area,
        );
    }
}
