//! # Slide Navigation
//!
//! A bounds-checked cursor over a deck. Every operation clamps; nothing
//! wraps and nothing errors.
//!
//! ```text
//! index:   0   1   2   3        deck_len = 4
//!          ◄── prev     next ──►
//!          └─ stays at 0   stays at 3 ─┘
//! ```
//!
//! Keys, clicks and taps all funnel into [`NavCommand`] before touching the index.

/// What the user asked for, independent of how they asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Advance,
    Retreat,
    First,
    Last,
}

impl NavCommand {
    /// Maps a pointer press to a command: right half advances, left half retreats.
    ///
    /// `x` and `surface_left` are in the same coordinate space. A press exactly
    /// on the midpoint counts as the left half.
    pub fn from_pointer(x: f32, surface_left: f32, surface_width: f32) -> Self {
        let relative = x - surface_left;
        if relative > surface_width / 2.0 {
            NavCommand::Advance
        } else {
            NavCommand::Retreat
        }
    }
}

/// Current slide index for a deck of a given length.
///
/// Invariant: `current_index <= deck_len.saturating_sub(1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    current_index: usize,
    deck_len: usize,
}

impl Navigator {
    pub fn new(deck_len: usize) -> Self {
        Self {
            current_index: 0,
            deck_len,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn deck_len(&self) -> usize {
        self.deck_len
    }

    /// Points the navigator at a fresh deck, back on the first slide.
    pub fn reset(&mut self, deck_len: usize) {
        self.deck_len = deck_len;
        self.current_index = 0;
    }

    fn last_index(&self) -> usize {
        self.deck_len.saturating_sub(1)
    }

    pub fn next(&mut self) {
        self.current_index = (self.current_index + 1).min(self.last_index());
    }

    pub fn prev(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Jumps to `index`, clamped into the deck.
    pub fn go_to(&mut self, index: usize) {
        self.current_index = index.min(self.last_index());
    }

    pub fn apply(&mut self, command: NavCommand) {
        match command {
            NavCommand::Advance => self.next(),
            NavCommand::Retreat => self.prev(),
            NavCommand::First => self.go_to(0),
            NavCommand::Last => self.go_to(self.last_index()),
        }
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index >= self.last_index()
    }

    /// Progress through the deck as a percentage in `[100/N, 100]`.
    /// An empty deck reports 0.
    pub fn progress(&self) -> f64 {
        if self.deck_len == 0 {
            return 0.0;
        }
        (self.current_index + 1) as f64 / self.deck_len as f64 * 100.0
    }
}
