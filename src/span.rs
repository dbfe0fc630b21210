//! Span types: engine-proposed corrections and advisory flags.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A correction proposed by a grammar engine, anchored to one text snapshot.
///
/// ## Byte Offsets
///
/// `offset` and `length` are byte offsets into the exact text the engine was
/// given. This matches Rust's string slicing semantics:
///
/// ```rust
/// use proofline::MatchSpan;
///
/// let text = "I has a apple";
/// let span = MatchSpan::new(2, 3, ["have"]);
///
/// assert_eq!(&text[span.range()], "has");
/// ```
///
/// ## Snapshot Binding
///
/// A span is only meaningful for the text it was computed against. Once that
/// text changes, offsets may point into the middle of a character or past the
/// end; [`MatchSpan::check_against`] detects those cases so callers can skip
/// the span instead of panicking on a bad slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    /// Byte offset where the flagged region starts.
    pub offset: usize,
    /// Byte length of the flagged region.
    pub length: usize,
    /// Candidate replacements, best first. Empty means advisory only.
    #[serde(default)]
    pub replacements: Vec<String>,
    /// Human-readable explanation from the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Engine rule identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl MatchSpan {
    /// Create a new span.
    #[must_use]
    pub fn new<I, S>(offset: usize, length: usize, replacements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            offset,
            length,
            replacements: replacements.into_iter().map(Into::into).collect(),
            message: None,
            rule_id: None,
        }
    }

    /// Attach an engine message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach an engine rule identifier.
    #[must_use]
    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    /// Exclusive end offset. Saturates instead of overflowing.
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// The byte range this span covers.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.end()
    }

    /// The best replacement, if the engine offered any.
    #[must_use]
    pub fn best_replacement(&self) -> Option<&str> {
        self.replacements.first().map(String::as_str)
    }

    /// Verify that this span describes a sliceable region of `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSpan`] when the span runs past the end of
    /// `text` or either bound falls inside a multi-byte character.
    pub fn check_against(&self, text: &str) -> Result<()> {
        let in_bounds = self
            .offset
            .checked_add(self.length)
            .is_some_and(|end| end <= text.len());

        if in_bounds && text.is_char_boundary(self.offset) && text.is_char_boundary(self.end()) {
            Ok(())
        } else {
            Err(Error::MalformedSpan {
                offset: self.offset,
                length: self.length,
                text_len: text.len(),
            })
        }
    }
}

impl std::fmt::Display for MatchSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MatchSpan {{ span: {}..{}, replacements: {} }}",
            self.offset,
            self.end(),
            self.replacements.len()
        )
    }
}

/// A region of the raw input to decorate as a likely misspelling.
///
/// Advisory spans never change the document; they only tell the
/// presentation layer where to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvisorySpan {
    /// Byte offset of the flagged token.
    pub offset: usize,
    /// Byte length of the flagged token.
    pub length: usize,
}

impl AdvisorySpan {
    /// Create a new advisory span.
    #[must_use]
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// The byte range this span covers.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}
