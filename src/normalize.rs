//! Structural normalization.
//!
//! Canonicalizes spacing, punctuation and sentence capitalization with an
//! ordered list of rewrite rules. No external calls, no failure mode.
//!
//! ## The Rule Order
//!
//! Each rule rewrites the whole string and hands its output to the next:
//!
//! ```text
//! 1. collapse whitespace, trim       "a  test .this"  -> "a test .this"
//! 2. drop space before punctuation   "a test .this"   -> "a test.this"
//! 3. collapse . and , runs           "wait..."        -> "wait."
//! 4. space after . ! ? before letter "test.this"      -> "test. this"
//! 5. space after comma between words "a,b"            -> "a, b"
//! 6. split glued sentences           "endNext"        -> "end. Next"
//! 7. join wrapped lowercase lines    "a\nb"           -> "a b"
//! 8. capitalize each ". " segment    "a test. this"   -> "A test. This"
//! 9. ensure terminal punctuation     "A test. This"   -> "A test. This."
//! ```
//!
//! Order matters: rule 4 relies on rule 1 having reduced every whitespace
//! run to one space, and rule 8 relies on rule 4 having produced the `". "`
//! delimiter it splits on.
//!
//! ## Idempotence
//!
//! The pipeline runs the normalizer twice per cycle (before and after
//! merging), so `normalize(normalize(x)) == normalize(x)` must hold. Rule
//! interaction is where that breaks, which is why the patterns avoid
//! consuming context they do not rewrite:
//!
//! | Rule | Pattern | Non-idempotent variant avoided |
//! |------|---------|--------------------------------|
//! | 5 | `\b,\b` | `(\w),(\w)` leaves `a, b,c` |
//! | 6 | `([\p{Ll}\p{N}_])(\p{Lu})` | `(\w)(\p{Lu})` leaves `U. SA` |
//! | 9 | trailing `,` becomes `.` | appending gives `a,.`, which rule 3 rewrites |
//!
//! Rule 7 never fires after rule 1 has flattened line breaks; it stays in the
//! list for custom rule sets that drop the whitespace collapse.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// How a rule rewrites its input.
#[derive(Debug, Clone)]
pub enum Rewrite {
    /// Replace every match of `pattern` with `replacement` (`$n` expands groups).
    Regex {
        /// The pattern to match.
        pattern: Regex,
        /// The substitution template.
        replacement: String,
    },
    /// Rewrite the text with a plain function.
    Func(fn(&str) -> String),
}

/// One named step of the normalization pipeline.
#[derive(Debug, Clone)]
pub struct NormalizationRule {
    name: String,
    rewrite: Rewrite,
}

impl NormalizationRule {
    /// Build a regex rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRule`] if `pattern` does not compile.
    pub fn regex(name: impl Into<String>, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| Error::InvalidRule {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            rewrite: Rewrite::Regex {
                pattern,
                replacement: replacement.into(),
            },
        })
    }

    /// Build a rule from a rewrite function.
    #[must_use]
    pub fn func(name: impl Into<String>, f: fn(&str) -> String) -> Self {
        Self {
            name: name.into(),
            rewrite: Rewrite::Func(f),
        }
    }

    /// The rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this rule to `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        match &self.rewrite {
            Rewrite::Regex {
                pattern,
                replacement,
            } => pattern.replace_all(text, replacement.as_str()).into_owned(),
            Rewrite::Func(f) => f(text),
        }
    }
}

static DEFAULT_RULES: LazyLock<Vec<NormalizationRule>> = LazyLock::new(|| {
    let regex = |name: &str, pattern: &str, replacement: &str| {
        NormalizationRule::regex(name, pattern, replacement).expect("built-in pattern compiles")
    };

    vec![
        NormalizationRule::func("collapse_whitespace", collapse_whitespace),
        regex("space_before_punctuation", r"\s+([.,:;!?])", "$1"),
        regex("repeated_punctuation", r"[.,]{2,}", "."),
        regex("space_after_sentence_end", r"([.!?])\s*(\p{L})", "$1 $2"),
        regex("space_after_comma", r"\b,\b", ", "),
        regex("glued_sentences", r"([\p{Ll}\p{N}_])(\p{Lu})", "$1. $2"),
        regex("wrapped_lines", r"(\p{Ll})\n(\p{Ll})", "$1 $2"),
        NormalizationRule::func("capitalize_sentences", capitalize_sentences),
        NormalizationRule::func("terminal_punctuation", ensure_terminal_punctuation),
    ]
});

static DEFAULT_NORMALIZER: LazyLock<Normalizer> = LazyLock::new(Normalizer::default);

/// Ordered rule pipeline.
///
/// ## Example
///
/// ```rust
/// use proofline::Normalizer;
///
/// let normalizer = Normalizer::default();
/// let out = normalizer.normalize("this is  a test .this is another sentence");
///
/// assert_eq!(out, "This is a test. This is another sentence.");
/// assert_eq!(normalizer.normalize(&out), out);
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<NormalizationRule>,
}

impl Normalizer {
    /// Create a normalizer with a custom rule list, applied in order.
    #[must_use]
    pub fn with_rules(rules: Vec<NormalizationRule>) -> Self {
        Self { rules }
    }

    /// The rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[NormalizationRule] {
        &self.rules
    }

    /// Run every rule over `text`.
    ///
    /// Short-circuits to an empty string as soon as a rule leaves nothing,
    /// so blank input never reaches the later rules.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            out = rule.apply(&out);
            if out.is_empty() {
                return out;
            }
        }
        out
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_rules(DEFAULT_RULES.clone())
    }
}

/// Normalize with the built-in rule set.
#[must_use]
pub fn normalize(text: &str) -> String {
    DEFAULT_NORMALIZER.normalize(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn capitalize_sentences(text: &str) -> String {
    text.split(". ")
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(". ")
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ensure_terminal_punctuation(text: &str) -> String {
    match text.chars().last() {
        None | Some('.' | '!' | '?') => text.to_string(),
        Some(',') => {
            let mut out = text[..text.len() - 1].to_string();
            out.push('.');
            out
        }
        Some(_) => format!("{text}."),
    }
}
