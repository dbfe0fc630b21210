//! Correction merging.
//!
//! Applies engine-proposed replacements to the text they were computed
//! against, without letting one splice shift the offsets of another.
//!
//! ## Why Descending Order
//!
//! Replacing a span changes the length of everything after it. Working from
//! the end of the string backwards means every span still waiting to be
//! applied lies strictly before the current splice point, so its offsets are
//! untouched:
//!
//! ```text
//! Text:  "I has a apple"
//! Spans: [2..5 -> "have"], [6..7 -> "an"]
//!
//! Ascending:  "I have a apple"  then 6..7 is now " "   -> "I haveana apple"
//! Descending: "I has an apple"  then 2..5 still "has"  -> "I have an apple"
//! ```
//!
//! ## What Is Skipped
//!
//! | Span | Handling |
//! |------|----------|
//! | No replacements | Skipped (advisory only) |
//! | Past the end / splits a character | Skipped (malformed) |
//! | Overlaps an already applied span | Applied best-effort, logged |
//!
//! Spans that share an offset are applied in the order the engine supplied
//! them (the sort is stable). Overlapping spans are not rejected: the result
//! for them is unspecified, but merging never panics.
//!
//! The output is not re-normalized; the pipeline runs the normalizer again.

use tracing::debug;

use crate::MatchSpan;

/// Counts describing what a merge did with its spans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Spans whose first replacement was spliced in.
    pub applied: usize,
    /// Spans without any replacement.
    pub advisory: usize,
    /// Spans that did not fit the text.
    pub malformed: usize,
    /// Applied spans that reached into an earlier splice.
    pub overlapping: usize,
}

/// Apply every span's best replacement to `text`.
///
/// ## Example
///
/// ```rust
/// use proofline::{merge, MatchSpan};
///
/// let spans = [MatchSpan::new(2, 3, ["have"]), MatchSpan::new(6, 1, ["an"])];
/// assert_eq!(merge("I has a apple", &spans), "I have an apple");
/// ```
#[must_use]
pub fn merge(text: &str, spans: &[MatchSpan]) -> String {
    merge_with_report(text, spans).0
}

/// Like [`merge`], also reporting how each span was handled.
#[must_use]
pub fn merge_with_report(text: &str, spans: &[MatchSpan]) -> (String, MergeReport) {
    let mut order: Vec<&MatchSpan> = spans.iter().collect();
    order.sort_by(|a, b| b.offset.cmp(&a.offset));

    let mut out = text.to_string();
    let mut report = MergeReport::default();
    // Start of the most recent splice in `out`.
    let mut floor = text.len();

    for span in order {
        let Some(replacement) = span.best_replacement() else {
            report.advisory += 1;
            continue;
        };

        // The span must fit the snapshot it claims to describe, and the
        // buffer it is about to be spliced into.
        if let Err(err) = span.check_against(text).and_then(|()| span.check_against(&out)) {
            debug!(%span, error = %err, "skipping malformed span");
            report.malformed += 1;
            continue;
        }

        if span.end() > floor {
            debug!(%span, floor, "applying overlapping span");
            report.overlapping += 1;
        }

        out.replace_range(span.range(), replacement);
        floor = span.offset;
        report.applied += 1;
    }

    (out, report)
}
