//! # Outline Parser
//!
//! Turns dash-bullet outline text into a [`Deck`]. One slide per marker line:
//!
//! ```text
//! intro text            ← ignored (no marker)
//! - Big Idea            ← slide "Big Idea"
//!   - a memo            ← new slide (Flat) / memo of "Big Idea" (Memo)
//!
//! - Next                ← slide "Next"
//! ```
//!
//! If the text contains an `<answer>…</answer>` region, only its inner
//! content is scanned. Parsing never fails: malformed input yields fewer
//! slides, possibly none.

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::core::tags;

/// `^\s*- (.*)$`: optional indentation, a dash, one space, then content.
static RE_SLIDE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)- (.*)$").expect("valid regex: RE_SLIDE_MARKER")
});

/// How indented marker lines are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndentMode {
    /// Every marker line starts a new slide, indented or not.
    #[default]
    Flat,
    /// Unindented markers start slides; indented markers become memos.
    Memo,
}

/// One slide: a headline shown full-screen plus optional speaker memos.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slide {
    pub text: String,
    pub memos: Vec<String>,
}

impl Slide {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            memos: Vec::new(),
        }
    }
}

/// Slides in document order. Built in one pass, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slide> {
        self.slides.iter()
    }

    /// Renders the deck back to outline text. Memos are only written in
    /// `Memo` mode, since `Flat` would read them back as slides.
    pub fn to_outline(&self, mode: IndentMode) -> String {
        let mut lines = Vec::with_capacity(self.slides.len());
        for slide in &self.slides {
            lines.push(format!("- {}", slide.text));
            if mode == IndentMode::Memo {
                lines.extend(slide.memos.iter().map(|memo| format!("  - {memo}")));
            }
        }
        lines.join("\n")
    }
}

impl<'a> IntoIterator for &'a Deck {
    type Item = &'a Slide;
    type IntoIter = std::slice::Iter<'a, Slide>;

    fn into_iter(self) -> Self::IntoIter {
        self.slides.iter()
    }
}

/// Parses with the canonical grammar ([`IndentMode::Flat`]).
pub fn parse(input: &str) -> Deck {
    parse_with(input, IndentMode::Flat)
}

/// Parses `input` into a deck using the given indentation grammar.
pub fn parse_with(input: &str, mode: IndentMode) -> Deck {
    let body = tags::answer_region(input).unwrap_or(input);
    let normalized = body.replace("\r\n", "\n").replace('\r', "\n");

    let mut slides = Vec::new();
    let mut current: Option<Slide> = None;

    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            continue;
        }
        let Some(caps) = RE_SLIDE_MARKER.captures(line) else {
            continue;
        };
        let indented = !caps[1].is_empty();
        let content = caps[2].trim();
        if content.is_empty() {
            continue;
        }

        match mode {
            IndentMode::Memo if indented => {
                // An indented marker before the first slide has nothing to attach to.
                if let Some(slide) = current.as_mut() {
                    slide.memos.push(content.to_string());
                }
            }
            _ => {
                if let Some(done) = current.replace(Slide::new(content)) {
                    slides.push(done);
                }
            }
        }
    }
    slides.extend(current);

    Deck::new(slides)
}

/// True if `text` contains at least one line that would produce a slide.
pub fn has_slide_marker(text: &str) -> bool {
    !parse(text).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(deck: &Deck) -> Vec<&str> {
        deck.iter().map(|s| s.text.as_str()).collect()
    }

    /// Generates one test per grammar case: input => expected slide texts (Flat mode).
    macro_rules! test_flat_grammar {
        ( $($name:ident: $input:expr => [$($expected:expr),*],)+ ) => {
            $(
                #[test]
                fn $name() {
                    let deck = parse($input);
                    let expected: Vec<&str> = vec![$($expected),*];
                    assert_eq!(texts(&deck), expected);
                    assert!(deck.iter().all(|s| s.memos.is_empty()));
                }
            )+
        };
    }

    test_flat_grammar! {
        test_grammar_basic: "- Slide One\n- Slide Two\n" => ["Slide One", "Slide Two"],
        test_grammar_noise_and_blank_lines: "intro text\n\n- Only Slide\n\ntrailing junk" => ["Only Slide"],
        test_grammar_empty_input: "" => [],
        test_grammar_no_markers: "no dashes at all" => [],
        test_grammar_indented_is_slide: "- One\n  - Two\n\t- Three" => ["One", "Two", "Three"],
        test_grammar_content_trimmed: "-   padded   " => ["padded"],
        test_grammar_dash_needs_space: "-nospace\n--double\n- ok" => ["ok"],
        test_grammar_empty_marker_skipped: "- \n-    \n- real" => ["real"],
        test_grammar_crlf: "- A\r\n- B\r\n" => ["A", "B"],
        test_grammar_lone_cr: "- A\r- B" => ["A", "B"],
        test_grammar_inner_dash_kept: "- one - two" => ["one - two"],
        test_grammar_japanese: "- 高橋メソッド\n- 巨大な文字" => ["高橋メソッド", "巨大な文字"],
    }

    #[test]
    fn test_parse_basic_has_no_memos() {
        let deck = parse("- Slide One\n- Slide Two\n");
        assert_eq!(
            deck,
            Deck::new(vec![Slide::new("Slide One"), Slide::new("Slide Two")])
        );
    }

    #[test]
    fn test_answer_region_only() {
        let input = "<reasoning>\n- not a slide\n</reasoning>\n<answer>\n- A\n- B\n</answer>\n- outside";
        assert_eq!(texts(&parse(input)), vec!["A", "B"]);
    }

    #[test]
    fn test_unclosed_answer_scans_everything() {
        assert_eq!(texts(&parse("<answer>\n- A\n- B")), vec!["A", "B"]);
    }

    #[test]
    fn test_tagged_end_to_end() {
        let deck = parse("<answer>\n- 高橋メソッド\n- 巨大な文字\n</answer>");
        assert_eq!(texts(&deck), vec!["高橋メソッド", "巨大な文字"]);
    }

    #[test]
    fn test_memo_mode_attaches_indented_markers() {
        let deck = parse_with("- Title\n  - memo one\n  - memo two\n- Next", IndentMode::Memo);
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.slides()[0].text, "Title");
        assert_eq!(deck.slides()[0].memos, vec!["memo one", "memo two"]);
        assert_eq!(deck.slides()[1], Slide::new("Next"));
    }

    #[test]
    fn test_memo_mode_orphan_memo_ignored() {
        let deck = parse_with("  - orphan\n- Title", IndentMode::Memo);
        assert_eq!(deck, Deck::new(vec![Slide::new("Title")]));
    }

    #[test]
    fn test_round_trip_is_idempotent() {
        let deck = parse("noise\n- First\n\n- Second slide\n  - Third\n");
        let reparsed = parse(&deck.to_outline(IndentMode::Flat));
        assert_eq!(reparsed, deck);
    }

    #[test]
    fn test_memo_round_trip() {
        let source = "- Title\n  - memo\n- Next";
        let deck = parse_with(source, IndentMode::Memo);
        assert_eq!(deck.to_outline(IndentMode::Memo), source);
        assert_eq!(parse_with(&deck.to_outline(IndentMode::Memo), IndentMode::Memo), deck);
    }

    #[test]
    fn test_has_slide_marker() {
        assert!(has_slide_marker("junk\n- slide"));
        assert!(!has_slide_marker("junk\n-slide"));
        assert!(!has_slide_marker(""));
    }
}
