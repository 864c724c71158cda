//! Text fitting: wraps watermark text so every line fits a pixel width bound.
//!
//! # Greedy width-search wrap
//! Character count is a cheap proxy for pixel width. The fitter walks a
//! descending sequence of characters-per-line budgets, greedily word-wraps the
//! text at each budget, and accepts the first wrap whose lines all measure
//! within `max_line_width` pixels. Measurement is the only pixel-level work.
//!
//! Break positions always come from the character budget, never from a
//! pixel-exact greedy fill.
//!
//! Input is treated as one paragraph: existing newlines and runs of whitespace
//! collapse to single spaces before wrapping. Words are never split, so a word
//! wider than the bound at every budget yields the degenerate single-line block.

use serde::Serialize;
use tracing::debug;

use crate::layout::font_metrics::{TextExtent, TextMeasurer};

/// Lowest starting budget, so short strings still get a few candidates.
const MIN_START_BUDGET: usize = 8;

/// Wrapped lines with their measured extents.
///
/// `lines`, `line_widths` and `line_heights` always have equal lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrappedBlock {
    pub lines: Vec<String>,
    pub line_widths: Vec<u32>,
    pub line_heights: Vec<u32>,
    /// Characters-per-line budget that produced the accepted wrap.
    /// `None` for empty or degenerate blocks.
    pub char_budget: Option<usize>,
    /// True when no budget fit and the text was returned as a single,
    /// possibly overflowing, line.
    pub degenerate: bool,
}

impl WrappedBlock {
    fn from_measured(
        lines: Vec<String>,
        extents: &[TextExtent],
        char_budget: Option<usize>,
        degenerate: bool,
    ) -> Self {
        Self {
            line_widths: extents.iter().map(|e| e.width).collect(),
            line_heights: extents.iter().map(|e| e.height).collect(),
            lines,
            char_budget,
            degenerate,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// An empty block means "draw nothing".
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Width of the widest line, 0 when empty.
    pub fn max_width(&self) -> u32 {
        self.line_widths.iter().copied().max().unwrap_or(0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Search
// ────────────────────────────────────────────────────────────────────────────

/// Budgets tried by `fit`, strictly descending from `max(8, char_len)` to 1.
pub fn candidate_budgets(char_len: usize) -> impl Iterator<Item = usize> {
    (1..=char_len.max(MIN_START_BUDGET)).rev()
}

/// Wraps `text` so that each line measures at most `max_line_width` pixels.
///
/// Empty or whitespace-only text returns an empty block. When no budget fits,
/// returns the words joined by single spaces as one line with `degenerate` set.
pub fn fit<M>(text: &str, measurer: &M, max_line_width: u32) -> WrappedBlock
where
    M: TextMeasurer + ?Sized,
{
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return WrappedBlock::default();
    }

    let char_len = text.chars().count();
    for budget in candidate_budgets(char_len) {
        let lines = greedy_wrap(&words, budget);
        if let Some(extents) = measure_within(&lines, measurer, max_line_width) {
            return WrappedBlock::from_measured(lines, &extents, Some(budget), false);
        }
    }

    debug!(
        "No character budget fits {max_line_width}px for {} words; emitting one overflowing line",
        words.len()
    );
    let line = words.join(" ");
    let extent = measurer.measure(&line);
    WrappedBlock::from_measured(vec![line], &[extent], None, true)
}

/// Greedy word wrap by character count.
///
/// Words are appended to the current line (joined by one space) until the next
/// word would push it past `budget` characters. A word longer than the budget
/// sits alone on its own line.
pub fn greedy_wrap(words: &[&str], budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in words {
        let word_len = word.chars().count();
        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= budget {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Measures every line, bailing out at the first one wider than `max_width`.
fn measure_within<M>(lines: &[String], measurer: &M, max_width: u32) -> Option<Vec<TextExtent>>
where
    M: TextMeasurer + ?Sized,
{
    let mut extents = Vec::with_capacity(lines.len());
    for line in lines {
        let extent = measurer.measure(line);
        if extent.width > max_width {
            return None;
        }
        extents.push(extent);
    }
    Some(extents)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Every character is 10 px wide and 20 px tall.
    struct FixedAdvance;

    impl TextMeasurer for FixedAdvance {
        fn measure(&self, text: &str) -> TextExtent {
            let chars = text.chars().count() as u32;
            TextExtent {
                width: chars * 10,
                height: if chars == 0 { 0 } else { 20 },
            }
        }
    }

    /// Records the lengths of every line it is asked to measure.
    #[derive(Default)]
    struct Recording {
        seen: RefCell<Vec<String>>,
    }

    impl TextMeasurer for Recording {
        fn measure(&self, text: &str) -> TextExtent {
            self.seen.borrow_mut().push(text.to_string());
            FixedAdvance.measure(text)
        }
    }

    // ── greedy_wrap ─────────────────────────────────────────────────────────

    #[test]
    fn test_greedy_wrap_packs_words_up_to_budget() {
        let words = ["the", "quick", "brown", "fox"];
        assert_eq!(greedy_wrap(&words, 9), vec!["the quick", "brown fox"]);
        assert_eq!(greedy_wrap(&words, 8), vec!["the", "quick", "brown", "fox"]);
        assert_eq!(greedy_wrap(&words, 100), vec!["the quick brown fox"]);
    }

    #[test]
    fn test_greedy_wrap_overlong_word_gets_own_line() {
        let words = ["a", "watermarking", "b"];
        assert_eq!(greedy_wrap(&words, 4), vec!["a", "watermarking", "b"]);
    }

    #[test]
    fn test_greedy_wrap_counts_chars_not_bytes() {
        // "héllo wörld" is 11 chars but 13 bytes
        let words = ["héllo", "wörld"];
        assert_eq!(greedy_wrap(&words, 11), vec!["héllo wörld"]);
    }

    #[test]
    fn test_greedy_wrap_no_words_no_lines() {
        assert!(greedy_wrap(&[], 10).is_empty());
    }

    // ── candidate_budgets ───────────────────────────────────────────────────

    #[test]
    fn test_candidate_budgets_start_at_least_eight() {
        let budgets: Vec<usize> = candidate_budgets(3).collect();
        assert_eq!(budgets, vec![8, 7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_candidate_budgets_strictly_decreasing() {
        let budgets: Vec<usize> = candidate_budgets(40).collect();
        assert_eq!(budgets.first(), Some(&40));
        assert_eq!(budgets.last(), Some(&1));
        assert!(budgets.windows(2).all(|w| w[0] > w[1]));
    }

    // ── fit ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_fit_empty_text_is_empty_block() {
        let block = fit("", &FixedAdvance, 200);
        assert!(block.is_empty());
        assert!(block.line_widths.is_empty());
        assert!(block.line_heights.is_empty());
        assert!(!block.degenerate);
    }

    #[test]
    fn test_fit_whitespace_only_is_empty_block() {
        assert!(fit(" \n\t ", &FixedAdvance, 200).is_empty());
    }

    #[test]
    fn test_fit_hello_world_single_line() {
        let block = fit("Hello World", &FixedAdvance, 200);
        assert_eq!(block.lines, vec!["Hello World"]);
        assert_eq!(block.line_widths, vec![110]);
        assert_eq!(block.line_heights, vec![20]);
        assert_eq!(block.char_budget, Some(11));
        assert!(!block.degenerate);
    }

    #[test]
    fn test_fit_wraps_until_every_line_fits() {
        let text = "Confidential draft do not distribute";
        let block = fit(text, &FixedAdvance, 150);
        assert!(block.len() > 1);
        assert!(block.line_widths.iter().all(|w| *w <= 150));
        assert_eq!(block.lines.join(" "), text);
        assert_eq!(block.lines.len(), block.line_widths.len());
        assert_eq!(block.lines.len(), block.line_heights.len());
    }

    #[test]
    fn test_fit_normalizes_newlines() {
        let block = fit("Hello\nWorld", &FixedAdvance, 1000);
        assert_eq!(block.lines, vec!["Hello World"]);
    }

    #[test]
    fn test_fit_overlong_word_is_degenerate() {
        // 50 characters → 500 px, far wider than the 100 px bound
        let word = "x".repeat(50);
        let block = fit(&word, &FixedAdvance, 100);
        assert!(block.degenerate);
        assert_eq!(block.char_budget, None);
        assert_eq!(block.lines, vec![word]);
        assert_eq!(block.line_widths, vec![500]);
    }

    #[test]
    fn test_fit_degenerate_line_collapses_whitespace() {
        let block = fit("aaaaaaaaaaaa\n  bbbbbbbbbbbb", &FixedAdvance, 50);
        assert!(block.degenerate);
        assert_eq!(block.lines, vec!["aaaaaaaaaaaa bbbbbbbbbbbb"]);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let text = "Sample watermark text that wraps over several lines";
        let first = fit(text, &FixedAdvance, 180);
        for _ in 0..5 {
            assert_eq!(fit(text, &FixedAdvance, 180), first);
        }
    }

    #[test]
    fn test_fit_accepts_first_fitting_budget_in_descending_order() {
        let text = "one two three four five six seven eight nine ten";
        let max_width = 95;
        let block = fit(text, &FixedAdvance, max_width);
        let accepted = block.char_budget.expect("text is fittable");

        let words: Vec<&str> = text.split_whitespace().collect();
        for budget in candidate_budgets(text.chars().count()).take_while(|b| *b > accepted) {
            let lines = greedy_wrap(&words, budget);
            assert!(
                lines.iter().any(|l| FixedAdvance.measure(l).width > max_width),
                "budget {budget} fits but a smaller one was chosen"
            );
        }
        assert_eq!(block.lines, greedy_wrap(&words, accepted));
    }

    #[test]
    fn test_fit_stops_measuring_at_first_fit() {
        let recorder = Recording::default();
        let block = fit("Hello World", &recorder, 200);
        assert_eq!(block.char_budget, Some(11));
        assert_eq!(*recorder.seen.borrow(), vec!["Hello World".to_string()]);
    }

    #[test]
    fn test_fit_with_real_font_keeps_every_line_within_bound() {
        let font = crate::layout::font_resolver::fixture_font(40);
        let max_width = crate::layout::max_line_width(400);
        let text = "Hello World watermark text";

        let block = fit(text, &font, max_width);
        assert!(!block.degenerate);
        assert!(block.len() > 1, "26 chars at 40px cannot fit 320px on one line");
        assert_eq!(block.lines.join(" "), text);
        for (line, width) in block.lines.iter().zip(&block.line_widths) {
            assert!(*width <= max_width, "{line:?} is {width}px");
            assert_eq!(font.measure(line).width, *width);
        }
    }
}
