//! Property-based tests for the correction pipeline.
//!
//! These tests verify the invariants the live session depends on:
//! - Idempotence: normalizing normalized text changes nothing
//! - Merge safety: splices never disturb text outside their spans
//! - Bounds: advisory spans always point at whole tokens of the input

use std::sync::Arc;

use proptest::prelude::*;
use proofline::{merge, normalize, tokens, Highlighter, MatchSpan, Result, SpellEngine};

/// Flags every word containing a `q`, without any search.
struct QSpeller;

impl SpellEngine for QSpeller {
    fn correct(&self, token: &str) -> Result<String> {
        Ok(token.replace(['q', 'Q'], "k"))
    }
}

// =============================================================================
// Test Generators
// =============================================================================

/// Messy typed text: letters, spaces, line breaks and punctuation.
fn typed_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z .,!?;:\n]{0,60}").unwrap()
}

/// Text with word-like structure, separated by random whitespace.
fn word_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-zA-Z]{1,10}").unwrap(),
            prop::string::string_regex("[ \n]{1,3}").unwrap(),
        ),
        0..15,
    )
    .prop_map(|parts| {
        parts
            .into_iter()
            .map(|(word, gap)| word + &gap)
            .collect::<String>()
    })
}

/// A text plus non-overlapping spans over it.
///
/// Built as alternating (kept, replaced, replacement) pieces so every span
/// lands on a known region. Replaced regions are non-empty, so offsets are
/// strictly increasing.
fn text_with_spans() -> impl Strategy<Value = (String, Vec<MatchSpan>, Vec<(String, String)>)> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-z ]{0,8}").unwrap(),
            prop::string::string_regex("[a-z]{1,5}").unwrap(),
            prop::string::string_regex("[A-Z]{0,5}").unwrap(),
        ),
        0..8,
    )
    .prop_map(|pieces| {
        let mut text = String::new();
        let mut spans = Vec::new();
        let mut expected = Vec::new();
        for (kept, replaced, replacement) in pieces {
            text.push_str(&kept);
            spans.push(MatchSpan::new(text.len(), replaced.len(), [replacement.clone()]));
            text.push_str(&replaced);
            expected.push((kept, replacement));
        }
        (text, spans, expected)
    })
}

// =============================================================================
// Normalizer Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_normalize_idempotent(text in typed_text()) {
        let once = normalize(&text);
        let twice = normalize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_normalize_blank_iff_no_content(text in typed_text()) {
        let out = normalize(&text);
        if text.trim().is_empty() {
            prop_assert!(out.is_empty());
        } else {
            prop_assert!(!out.is_empty());
        }
    }

    #[test]
    fn prop_normalize_canonical_spacing(text in typed_text()) {
        let out = normalize(&text);
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.contains('\n'));
        prop_assert_eq!(out.trim(), out.as_str());
    }

    #[test]
    fn prop_normalize_terminal_punctuation(text in typed_text()) {
        let out = normalize(&text);
        if let Some(last) = out.chars().last() {
            prop_assert!(matches!(last, '.' | '!' | '?'), "ends with {:?}", last);
        }
    }
}

// =============================================================================
// Merge Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_merge_rebuilds_expected((text, spans, expected) in text_with_spans()) {
        let out = merge(&text, &spans);
        let want: String = expected.iter().map(|(kept, repl)| format!("{kept}{repl}")).collect();
        prop_assert_eq!(out, want);
    }

    #[test]
    fn prop_merge_length_accounting((text, spans, _) in text_with_spans()) {
        let out = merge(&text, &spans);
        let delta: isize = spans
            .iter()
            .map(|s| s.replacements[0].len() as isize - s.length as isize)
            .sum();
        prop_assert_eq!(out.len() as isize, text.len() as isize + delta);
    }

    #[test]
    fn prop_merge_span_order_irrelevant((text, spans, _) in text_with_spans()) {
        let mut reversed = spans.clone();
        reversed.reverse();
        prop_assert_eq!(merge(&text, &spans), merge(&text, &reversed));
    }

    #[test]
    fn prop_merge_never_panics(
        text in "\\PC{0,30}",
        raw in prop::collection::vec((0usize..40, 0usize..10, "\\PC{0,4}"), 0..6),
    ) {
        let spans: Vec<MatchSpan> = raw
            .into_iter()
            .map(|(offset, length, repl)| MatchSpan::new(offset, length, [repl]))
            .collect();
        let _ = merge(&text, &spans);
    }
}

// =============================================================================
// Highlighter Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_highlight_spans_are_tokens(text in word_text()) {
        let mut highlighter = Highlighter::new(Arc::new(QSpeller));
        let spans = highlighter.highlight(&text).unwrap();

        let all: Vec<(usize, &str)> = tokens(&text).collect();
        for span in &spans {
            prop_assert!(span.offset + span.length <= text.len());
            prop_assert!(all.iter().any(|&(at, tok)| at == span.offset && tok.len() == span.length));
            prop_assert!(text[span.range()].to_lowercase().contains('q'));
        }
        let expected = all
            .iter()
            .filter(|(_, tok)| tok.len() > 1 && tok.to_lowercase().contains('q'))
            .count();
        prop_assert_eq!(spans.len(), expected);
        for pair in spans.windows(2) {
            prop_assert!(pair[0].offset + pair[0].length <= pair[1].offset);
        }
    }

    #[test]
    fn prop_tokens_cover_non_whitespace(text in word_text()) {
        let rebuilt: String = tokens(&text).map(|(_, tok)| tok).collect();
        let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(rebuilt, expected);
    }
}
