//! Advisory spell highlighting.
//!
//! A cheap, word-level pass over the raw input that flags tokens the
//! spelling engine would change. It never edits the text and never waits on
//! the grammar engine.
//!
//! ## Tokens
//!
//! Tokens are maximal runs of non-whitespace, so punctuation stays attached:
//!
//! ```text
//! "Ths is, fyne"
//!  ^^^ ^^^  ^^^^
//!  0   4    8
//! ```
//!
//! `"is,"` is looked up as a whole. Single graphemes and purely numeric
//! tokens are never checked.
//!
//! ## Cache
//!
//! Corrections are cached by lowercased token for the lifetime of the
//! highlighter. Entries are never invalidated: if the spelling engine's
//! answers change, old flags may linger until a new highlighter is built.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::{AdvisorySpan, Result, SpellEngine};

/// Split `text` on whitespace, yielding each token with its byte offset.
///
/// ```rust
/// use proofline::tokens;
///
/// let found: Vec<_> = tokens("  two  words").collect();
/// assert_eq!(found, vec![(2, "two"), (7, "words")]);
/// ```
pub fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    let mut chars = text.char_indices().peekable();
    std::iter::from_fn(move || {
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        let (start, _) = chars.next()?;
        let mut end = text.len();
        while let Some(&(idx, c)) = chars.peek() {
            if c.is_whitespace() {
                end = idx;
                break;
            }
            chars.next();
        }
        Some((start, &text[start..end]))
    })
}

/// Word-level highlighter with a private correction cache.
pub struct Highlighter {
    speller: Arc<dyn SpellEngine>,
    cache: HashMap<String, String>,
}

impl Highlighter {
    /// Create a highlighter backed by `speller`.
    pub fn new(speller: Arc<dyn SpellEngine>) -> Self {
        Self {
            speller,
            cache: HashMap::new(),
        }
    }

    /// Number of cached corrections.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Flag every token whose correction differs from it, ignoring case.
    ///
    /// Spans are returned in text order and point into `text` itself.
    ///
    /// # Errors
    ///
    /// Propagates the first spelling engine failure. Corrections obtained
    /// before the failure stay cached.
    pub fn highlight(&mut self, text: &str) -> Result<Vec<AdvisorySpan>> {
        let mut spans = Vec::new();

        for (offset, token) in tokens(text) {
            if should_skip(token) {
                continue;
            }

            let key = token.to_lowercase();
            let corrected = match self.cache.get(&key) {
                Some(hit) => hit.to_lowercase(),
                None => {
                    trace!(token, "spelling cache miss");
                    let fresh = self.speller.correct(token)?;
                    let folded = fresh.to_lowercase();
                    self.cache.insert(key.clone(), fresh);
                    folded
                }
            };

            if corrected != key {
                spans.push(AdvisorySpan::new(offset, token.len()));
            }
        }

        Ok(spans)
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("cache_len", &self.cache.len())
            .finish_non_exhaustive()
    }
}

fn should_skip(token: &str) -> bool {
    token.graphemes(true).nth(1).is_none() || token.chars().all(char::is_numeric)
}
