//! # Reasoning / Answer Tags
//!
//! Models are asked to think inside `<reasoning>…</reasoning>` and put the
//! outline inside `<answer>…</answer>`. Either tag may be missing, and they
//! need not be the only content in the response.
//!
//! ```text
//! "<reasoning>why</reasoning>\n<answer>\n- A\n</answer>"
//!        │                              │
//!        ▼                              ▼
//!   reasoning = "why"              answer = "- A"
//! ```
//!
//! Untagged text is assumed to already be the answer.

use regex::Regex;
use std::sync::LazyLock;

const REASONING_OPEN: &str = "<reasoning>";
const REASONING_CLOSE: &str = "</reasoning>";
const ANSWER_OPEN: &str = "<answer>";
const ANSWER_CLOSE: &str = "</answer>";

static RE_REASONING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<reasoning>(.*?)</reasoning>").expect("valid regex: RE_REASONING")
});

static RE_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<answer>(.*?)</answer>").expect("valid regex: RE_ANSWER")
});

/// The two halves of a model response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Trimmed `<reasoning>` content, or empty when the tag is absent.
    pub reasoning: String,
    /// Trimmed `<answer>` content, or the whole trimmed input when absent.
    pub answer: String,
}

/// Splits a complete response into reasoning and answer. Never fails.
pub fn extract(input: &str) -> Extracted {
    let reasoning = capture(&RE_REASONING, input)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    let answer = capture(&RE_ANSWER, input)
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| input.trim().to_string());

    Extracted { reasoning, answer }
}

/// Raw (untrimmed) inner content of the first closed `<answer>` region.
pub fn answer_region(input: &str) -> Option<&str> {
    capture(&RE_ANSWER, input)
}

/// Like [`extract`], but for a response that is still streaming in.
///
/// An opened tag without its closing tag runs to the end of the snapshot,
/// with any half-received closing tag dropped. While reasoning has started
/// and no answer has, the answer is empty rather than the raw snapshot.
pub fn extract_partial(snapshot: &str) -> Extracted {
    let reasoning = open_region(snapshot, REASONING_OPEN, REASONING_CLOSE)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let answer = match open_region(snapshot, ANSWER_OPEN, ANSWER_CLOSE) {
        Some(region) => region.trim().to_string(),
        None if snapshot.contains(REASONING_OPEN) => String::new(),
        None => strip_partial_suffix(snapshot, ANSWER_OPEN).trim().to_string(),
    };

    Extracted { reasoning, answer }
}

fn capture<'a>(re: &Regex, input: &'a str) -> Option<&'a str> {
    re.captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Content after `open` up to `close`, or to the end if `close` hasn't arrived.
fn open_region<'a>(snapshot: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = snapshot.find(open)? + open.len();
    let rest = &snapshot[start..];
    match rest.find(close) {
        Some(end) => Some(&rest[..end]),
        None => Some(strip_partial_suffix(rest, close)),
    }
}

/// Drops a trailing proper prefix of `tag` (e.g. `"</ans"` for `"</answer>"`).
fn strip_partial_suffix<'a>(text: &'a str, tag: &str) -> &'a str {
    (1..tag.len())
        .rev()
        .find(|&len| text.ends_with(&tag[..len]))
        .map(|len| &text[..text.len() - len])
        .unwrap_or(text)
}
