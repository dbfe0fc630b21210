//! Frequency-ranked spelling correction.
//!
//! A small edit-distance corrector: the best correction for an unknown word
//! is the most frequent known word one edit away, else two edits away.
//!
//! ## Edits
//!
//! For `"ths"` over the alphabet `a..=z`:
//!
//! ```text
//! deletes     "hs", "ts", "th"
//! transposes  "hts", "tsh"
//! replaces    "ahs", "bhs", ..., "thz"
//! inserts     "aths", ..., "this", ..., "thsz"
//! ```
//!
//! Candidates are ranked by corpus count. Equal counts fall back to
//! lexicographic order so results never depend on hash iteration order.
//!
//! ## Cost
//!
//! A word of length n has `54n + 25` single edits, each looked up directly.
//! The two-edit set is roughly the square of that, so it is never built:
//! instead the known vocabulary is scanned once, skipping words whose length
//! differs by more than two, and each survivor is compared with a bounded
//! optimal-string-alignment distance (substitution, insertion, deletion,
//! adjacent transposition). Callers that check many tokens should still
//! cache results (the [`Highlighter`](crate::Highlighter) does).

use std::collections::{HashMap, HashSet};

use crate::{Result, SpellEngine};

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Spelling engine backed by word frequencies.
///
/// ## Example
///
/// ```rust
/// use proofline::{FrequencySpeller, SpellEngine};
///
/// let speller = FrequencySpeller::from_corpus("this is fine, this is the line");
/// assert_eq!(speller.correct("ths").unwrap(), "this");
/// assert_eq!(speller.correct("Fyne").unwrap(), "Fine");
/// assert_eq!(speller.correct("is").unwrap(), "is");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrequencySpeller {
    counts: HashMap<String, u64>,
}

impl FrequencySpeller {
    /// Create an empty speller. It knows no words and corrects nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every alphabetic word in `corpus`, lowercased.
    #[must_use]
    pub fn from_corpus(corpus: &str) -> Self {
        let mut speller = Self::new();
        for word in corpus.split(|c: char| !c.is_alphabetic()) {
            if !word.is_empty() {
                speller.insert(&word.to_lowercase(), 1);
            }
        }
        speller
    }

    /// Build from explicit `(word, count)` pairs.
    #[must_use]
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        let mut speller = Self::new();
        for (word, count) in counts {
            speller.insert(word.as_ref(), count);
        }
        speller
    }

    /// Add `count` occurrences of `word`.
    pub fn insert(&mut self, word: &str, count: u64) {
        *self.counts.entry(word.to_lowercase()).or_insert(0) += count;
    }

    /// Number of distinct known words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no words are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Corpus count for `word` (case-insensitive).
    #[must_use]
    pub fn frequency(&self, word: &str) -> u64 {
        self.counts.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    /// Best lowercase correction for `word`, or `None` if it is already known
    /// or nothing within two edits is.
    #[must_use]
    pub fn suggest(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        if self.counts.contains_key(&word) {
            return None;
        }

        if let Some(best) = self.best_known(edits1(&word).iter()) {
            return Some(best);
        }

        let chars: Vec<char> = word.chars().collect();
        self.best_known(self.counts.keys().filter(|known| {
            known.chars().count().abs_diff(chars.len()) <= 2 && within_two_edits(&chars, known)
        }))
    }

    fn best_known<'a>(&self, candidates: impl Iterator<Item = &'a String>) -> Option<String> {
        candidates
            .filter_map(|w| self.counts.get(w).map(|&n| (n, w)))
            .max_by(|(na, a), (nb, b)| na.cmp(nb).then_with(|| b.cmp(a)))
            .map(|(_, w)| w.clone())
    }
}

impl SpellEngine for FrequencySpeller {
    fn correct(&self, token: &str) -> Result<String> {
        if token.is_empty() || !token.chars().all(char::is_alphabetic) {
            return Ok(token.to_string());
        }
        Ok(match self.suggest(token) {
            Some(fix) => match_leading_case(token, &fix),
            None => token.to_string(),
        })
    }
}

fn edits1(word: &str) -> HashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = HashSet::with_capacity(54 * chars.len() + 25);

    for i in 0..=chars.len() {
        let (left, right) = chars.split_at(i);
        let prefix: String = left.iter().collect();

        if let Some((&first, rest)) = right.split_first() {
            let rest: String = rest.iter().collect();
            out.insert(format!("{prefix}{rest}"));
            for c in ALPHABET.chars() {
                out.insert(format!("{prefix}{c}{rest}"));
            }
            if let Some(&second) = right.get(1) {
                let tail: String = right[2..].iter().collect();
                out.insert(format!("{prefix}{second}{first}{tail}"));
            }
        }

        let right: String = right.iter().collect();
        for c in ALPHABET.chars() {
            out.insert(format!("{prefix}{c}{right}"));
        }
    }

    out
}

/// Optimal string alignment distance between `a` and `b` is at most two.
fn within_two_edits(a: &[char], b: &str) -> bool {
    let b: Vec<char> = b.chars().collect();
    let mut before: Vec<usize> = Vec::new();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for i in 1..=a.len() {
        let mut row = vec![i; b.len() + 1];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut d = (prev[j] + 1).min(row[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                d = d.min(before[j - 2] + 1);
            }
            row[j] = d;
        }
        before = std::mem::replace(&mut prev, row);
    }

    prev[b.len()] <= 2
}

fn match_leading_case(original: &str, fix: &str) -> String {
    let capitalized = original.chars().next().is_some_and(char::is_uppercase);
    if !capitalized {
        return fix.to_string();
    }
    let mut chars = fix.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
