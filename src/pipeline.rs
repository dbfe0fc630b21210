//! One analysis cycle: normalize, check, merge, normalize again.
//!
//! ```text
//! raw ─> blank? ──yes──> Blank (no engine call)
//!         │no
//!         v
//!     same as last completed raw? ──yes──> Unchanged (no engine call)
//!         │no
//!         v
//!     normalize ─> engine.check ─> merge ─> normalize ─> Corrected
//! ```
//!
//! The cycle is split in two halves, [`Pipeline::plan`] and
//! [`Pipeline::finish`], so an async caller can run the engine call on a
//! worker between them. [`Pipeline::run`] does all of it inline.

use std::sync::Arc;

use tracing::debug;

use crate::{merge_with_report, GrammarEngine, MatchSpan, Normalizer, Result};

/// What a cycle should do with a given raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Empty or whitespace-only input: clear outputs, skip the engine.
    Blank,
    /// Identical to the input of the last completed cycle.
    Unchanged,
    /// Send this normalized text to the engine.
    Analyze {
        /// First-pass normalized text.
        normalized: String,
    },
}

/// Result of a full cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input was blank; the corrected output is empty.
    Blank,
    /// Input had already been analyzed; nothing was recomputed.
    Unchanged,
    /// Freshly corrected text.
    Corrected(String),
}

/// Normalizer plus grammar engine, with memory of the last completed input.
pub struct Pipeline {
    normalizer: Normalizer,
    grammar: Arc<dyn GrammarEngine>,
    locale: String,
    last_completed: Option<String>,
}

impl Pipeline {
    /// Create a pipeline using the built-in normalization rules.
    pub fn new(grammar: Arc<dyn GrammarEngine>, locale: impl Into<String>) -> Self {
        Self {
            normalizer: Normalizer::default(),
            grammar,
            locale: locale.into(),
            last_completed: None,
        }
    }

    /// Replace the normalizer.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The grammar engine, for callers that run the check themselves.
    #[must_use]
    pub fn grammar(&self) -> Arc<dyn GrammarEngine> {
        Arc::clone(&self.grammar)
    }

    /// The locale tag passed to the engine.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Raw input of the last completed cycle.
    #[must_use]
    pub fn last_completed(&self) -> Option<&str> {
        self.last_completed.as_deref()
    }

    /// Decide what to do with `raw`.
    #[must_use]
    pub fn plan(&self, raw: &str) -> Plan {
        if raw.trim().is_empty() {
            Plan::Blank
        } else if self.last_completed.as_deref() == Some(raw) {
            Plan::Unchanged
        } else {
            Plan::Analyze {
                normalized: self.normalizer.normalize(raw),
            }
        }
    }

    /// Apply engine spans to the first-pass text and record `raw` as done.
    ///
    /// `spans` must have been computed against `normalized`.
    pub fn finish(&mut self, raw: &str, normalized: &str, spans: &[MatchSpan]) -> String {
        let (merged, report) = merge_with_report(normalized, spans);
        let corrected = self.normalizer.normalize(&merged);
        debug!(
            applied = report.applied,
            advisory = report.advisory,
            malformed = report.malformed,
            overlapping = report.overlapping,
            len = corrected.len(),
            "analysis cycle complete"
        );
        self.last_completed = Some(raw.to_string());
        corrected
    }

    /// Forget the last completed input, so the next non-blank text is analyzed.
    pub fn reset(&mut self) {
        self.last_completed = None;
    }

    /// Run a whole cycle inline.
    ///
    /// # Errors
    ///
    /// Propagates grammar engine failures. On error nothing is recorded, so
    /// the same text is analyzed again next time.
    pub fn run(&mut self, raw: &str) -> Result<Outcome> {
        match self.plan(raw) {
            Plan::Blank => {
                self.reset();
                Ok(Outcome::Blank)
            }
            Plan::Unchanged => {
                debug!("input unchanged since last cycle, skipping");
                Ok(Outcome::Unchanged)
            }
            Plan::Analyze { normalized } => {
                let spans = self.grammar.check(&normalized, &self.locale)?;
                Ok(Outcome::Corrected(self.finish(raw, &normalized, &spans)))
            }
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("locale", &self.locale)
            .field("last_completed", &self.last_completed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Fixed(Vec<MatchSpan>);

    impl GrammarEngine for Fixed {
        fn check(&self, _text: &str, _locale: &str) -> Result<Vec<MatchSpan>> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    impl GrammarEngine for Down {
        fn check(&self, _text: &str, _locale: &str) -> Result<Vec<MatchSpan>> {
            Err(Error::AnalysisService("unavailable".into()))
        }
    }

    #[test]
    fn test_plan_blank() {
        let pipeline = Pipeline::new(Arc::new(Fixed(vec![])), "en-US");
        assert_eq!(pipeline.plan(""), Plan::Blank);
        assert_eq!(pipeline.plan(" \n "), Plan::Blank);
    }

    #[test]
    fn test_plan_normalizes() {
        let pipeline = Pipeline::new(Arc::new(Fixed(vec![])), "en-US");
        assert_eq!(
            pipeline.plan("hello  world"),
            Plan::Analyze {
                normalized: "Hello world.".to_string()
            }
        );
    }

    #[test]
    fn test_run_merges_and_renormalizes() {
        // Spans refer to the normalized text "I has a apple."
        let spans = vec![MatchSpan::new(2, 3, ["have"]), MatchSpan::new(6, 1, ["an"])];
        let mut pipeline = Pipeline::new(Arc::new(Fixed(spans)), "en-US");
        assert_eq!(
            pipeline.run("i has a apple").unwrap(),
            Outcome::Corrected("I have an apple.".to_string())
        );
        assert_eq!(pipeline.last_completed(), Some("i has a apple"));
    }

    #[test]
    fn test_second_normalize_cleans_merge() {
        // Replacement introduces a double space and a lowercase start.
        let spans = vec![MatchSpan::new(0, 5, ["well  hello"])];
        let mut pipeline = Pipeline::new(Arc::new(Fixed(spans)), "en-US");
        assert_eq!(
            pipeline.run("hello").unwrap(),
            Outcome::Corrected("Well hello.".to_string())
        );
    }

    #[test]
    fn test_unchanged_after_completion() {
        let mut pipeline = Pipeline::new(Arc::new(Fixed(vec![])), "en-US");
        pipeline.run("same").unwrap();
        assert_eq!(pipeline.run("same").unwrap(), Outcome::Unchanged);
    }

    #[test]
    fn test_blank_resets_memory() {
        let mut pipeline = Pipeline::new(Arc::new(Fixed(vec![])), "en-US");
        pipeline.run("text").unwrap();
        assert_eq!(pipeline.run("  ").unwrap(), Outcome::Blank);
        assert!(matches!(pipeline.run("text").unwrap(), Outcome::Corrected(_)));
    }

    #[test]
    fn test_engine_failure_records_nothing() {
        let mut pipeline = Pipeline::new(Arc::new(Down), "en-US");
        assert!(matches!(pipeline.run("text"), Err(Error::AnalysisService(_))));
        assert_eq!(pipeline.last_completed(), None);
    }
}
