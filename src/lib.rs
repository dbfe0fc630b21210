//! # proofline
//!
//! Live grammar and spelling correction for text that is still being typed.
//!
//! ## The Problem
//!
//! A grammar checker is slow and usually remote. Calling it on every
//! keystroke floods it with requests whose answers are stale before they
//! arrive. Calling it only on demand loses the "live" feel. On top of that,
//! raw user text is messy (doubled spaces, stray punctuation, missing
//! capitals) and the checker's answers are offsets into one exact snapshot
//! of the text.
//!
//! This crate sits between an editor and a checker:
//!
//! - edits are debounced, so a burst of typing produces one analysis
//! - text is scrubbed by a fixed rule pipeline before and after checking
//! - proposed corrections are spliced in without corrupting each other's offsets
//! - a cheap local speller marks likely misspellings while the user types
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`Normalizer`] | Ordered rewrite rules for whitespace, punctuation, capitals |
//! | [`merge`] | Applies [`MatchSpan`] replacements back to front |
//! | [`Debouncer`] | Quiet-period timer with single-flight gating |
//! | [`Highlighter`] | Per-token spelling check producing [`AdvisorySpan`]s |
//! | [`Pipeline`] | One analysis cycle, with no-op detection |
//! | [`Session`] | Async event loop tying it together |
//!
//! ## Flow
//!
//! ```text
//! edit ──> Debouncer ──(quiet period)──> normalize ──> GrammarEngine
//!   │                                                      │ spans
//!   │                                                      v
//!   │                            corrected text <── normalize <── merge
//!   │
//!   └──> Highlighter ──> SpellEngine ──> advisory spans
//! ```
//!
//! ## Quick Start
//!
//! The synchronous parts need no runtime:
//!
//! ```rust
//! use std::sync::Arc;
//! use proofline::{normalize, GrammarEngine, MatchSpan, Outcome, Pipeline, Result};
//!
//! assert_eq!(
//!     normalize("hello  world ,how are you"),
//!     "Hello world, how are you."
//! );
//!
//! struct Articles;
//!
//! impl GrammarEngine for Articles {
//!     fn check(&self, text: &str, _locale: &str) -> Result<Vec<MatchSpan>> {
//!         Ok(text.find(" a a").map(|i| MatchSpan::new(i + 1, 1, ["an"])).into_iter().collect())
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new(Arc::new(Articles), "en-US");
//! assert_eq!(
//!     pipeline.run("i ate a apple").unwrap(),
//!     Outcome::Corrected("I ate an apple.".to_string())
//! );
//! ```
//!
//! ## Live Sessions
//!
//! ```rust,ignore
//! use proofline::{Config, FrequencySpeller, Session};
//!
//! let handle = Session::spawn(Config::default(), grammar, Arc::new(speller))?;
//! let mut updates = handle.subscribe();
//!
//! handle.edit("ths is fyne")?;
//! while updates.changed().await.is_ok() {
//!     let out = updates.borrow().clone();
//!     render(&out.corrected_text, &out.advisory_spans, &out.status);
//! }
//! ```
//!
//! ## Offsets
//!
//! Every offset in this crate is a UTF-8 byte offset into the text it was
//! computed against. Adapters for engines that count differently (the
//! LanguageTool adapter counts UTF-16 units) convert at the boundary.

mod config;
mod debounce;
mod error;
mod highlight;
mod languagetool;
mod merge;
mod normalize;
mod pipeline;
mod session;
mod span;
mod speller;

pub use config::Config;
pub use debounce::{DebounceState, Debouncer};
pub use error::{Error, Result};
pub use highlight::{tokens, Highlighter};
pub use languagetool::parse_check_response;
pub use merge::{merge, merge_with_report, MergeReport};
pub use normalize::{normalize, NormalizationRule, Normalizer, Rewrite};
pub use pipeline::{Outcome, Pipeline, Plan};
pub use session::{Output, Session, SessionHandle, Status};
pub use span::{AdvisorySpan, MatchSpan};
pub use speller::FrequencySpeller;

#[cfg(feature = "languagetool")]
pub use languagetool::LanguageToolClient;

/// A grammar checking service.
///
/// Implementations are called from a blocking worker thread, so they may do
/// synchronous I/O. Returned spans must be byte offsets into `text`.
///
/// ```rust
/// use proofline::{GrammarEngine, MatchSpan, Result};
///
/// struct NoDoubleThe;
///
/// impl GrammarEngine for NoDoubleThe {
///     fn check(&self, text: &str, _locale: &str) -> Result<Vec<MatchSpan>> {
///         Ok(text
///             .match_indices("the the")
///             .map(|(i, _)| MatchSpan::new(i, 7, ["the"]))
///             .collect())
///     }
/// }
///
/// let spans = NoDoubleThe.check("the the cat", "en-US").unwrap();
/// assert_eq!(spans[0].offset, 0);
/// ```
pub trait GrammarEngine: Send + Sync {
    /// Check `text` in `locale` and return proposed corrections.
    ///
    /// # Errors
    ///
    /// Any failure to reach or understand the service. The session reports it
    /// as a status and keeps its previous output.
    fn check(&self, text: &str, locale: &str) -> Result<Vec<MatchSpan>>;
}

/// A single-word spelling corrector.
pub trait SpellEngine: Send + Sync {
    /// Best correction for `token`; the token itself when it is fine.
    ///
    /// # Errors
    ///
    /// Engine failures. The highlighter propagates them unchanged.
    fn correct(&self, token: &str) -> Result<String>;
}
