//! # Presenter
//!
//! Composes a [`Deck`], a [`Navigator`] and a [`FontFitter`] into the thing
//! the display surface talks to.
//!
//! ```text
//!   keys / clicks ──► NavCommand ──► Navigator ──► current slide
//!                                                      │
//!   container size ───────────────► FontFitter ◄───────┘
//!                                        │
//!                                        ▼
//!                                   font size
//! ```
//!
//! Presentation mode follows the surface: the presenter is told when the
//! full-screen context goes away and leaves presentation mode then, whoever
//! triggered it.

use log::{debug, info};

use crate::core::fit::{Extent, FitConfig, FitStrategy, FontFitter, TextMeasurer};
use crate::core::navigation::{NavCommand, Navigator};
use crate::core::outline::{Deck, Slide};

pub struct Presenter {
    deck: Deck,
    nav: Navigator,
    fitter: FontFitter,
    presenting: bool,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(FitConfig::default(), FitStrategy::default())
    }
}

impl Presenter {
    pub fn new(fit: FitConfig, strategy: FitStrategy) -> Self {
        Self {
            deck: Deck::default(),
            nav: Navigator::default(),
            fitter: FontFitter::new(fit, strategy),
            presenting: false,
        }
    }

    /// Replaces the deck wholesale and goes back to the first slide.
    pub fn load(&mut self, deck: Deck) {
        info!("Loaded deck with {} slides", deck.len());
        self.nav.reset(deck.len());
        self.deck = deck;
        self.fitter.invalidate();
        self.presenting = false;
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn current_index(&self) -> usize {
        self.nav.current_index()
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.deck.get(self.nav.current_index())
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn next(&mut self) {
        self.nav.next();
    }

    pub fn prev(&mut self) {
        self.nav.prev();
    }

    pub fn go_to(&mut self, index: usize) {
        self.nav.go_to(index);
    }

    pub fn apply(&mut self, command: NavCommand) {
        self.nav.apply(command);
        debug!(
            "{:?} -> slide {}/{}",
            command,
            self.nav.current_index() + 1,
            self.deck.len()
        );
    }

    /// A press on the surface: right half advances, left half retreats.
    pub fn pointer(&mut self, x: f32, surface_left: f32, surface_width: f32) {
        self.apply(NavCommand::from_pointer(x, surface_left, surface_width));
    }

    pub fn progress(&self) -> f64 {
        self.nav.progress()
    }

    /// `"3/10"`, or `"0/0"` for an empty deck.
    pub fn position_label(&self) -> String {
        if self.deck.is_empty() {
            return "0/0".to_string();
        }
        format!("{}/{}", self.nav.current_index() + 1, self.deck.len())
    }

    pub fn is_presenting(&self) -> bool {
        self.presenting
    }

    /// Enters presentation mode. Refused for an empty deck.
    pub fn enter_presentation(&mut self) -> bool {
        if self.deck.is_empty() {
            return false;
        }
        self.presenting = true;
        info!("Presentation started at slide {}", self.position_label());
        true
    }

    /// The surface reports its full-screen state. Losing it ends presentation
    /// mode; returns true if that happened now.
    pub fn on_fullscreen_change(&mut self, active: bool) -> bool {
        if active || !self.presenting {
            return false;
        }
        self.presenting = false;
        info!("Presentation ended at slide {}", self.position_label());
        true
    }

    /// Font size for the current slide in a container of the given size.
    pub fn font_size<M: TextMeasurer + ?Sized>(&mut self, container: Extent, measurer: &M) -> f32 {
        let text = self
            .deck
            .get(self.nav.current_index())
            .map(|slide| slide.text.as_str())
            .unwrap_or("");
        self.fitter.size_for(text, container, measurer)
    }

    pub fn fitter(&self) -> &FontFitter {
        &self.fitter
    }
}
