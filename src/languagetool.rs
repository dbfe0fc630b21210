//! LanguageTool wire format.
//!
//! Decodes the JSON returned by a LanguageTool server's `/v2/check` endpoint
//! into [`MatchSpan`]s, and (with the `languagetool` feature) provides a
//! blocking HTTP [`GrammarEngine`](crate::GrammarEngine).
//!
//! ## Offsets
//!
//! LanguageTool counts offsets in UTF-16 code units. Rust strings are UTF-8,
//! so every match is re-anchored to byte offsets of the checked text:
//!
//! ```text
//! text:   "né le"      bytes: n=0 é=1..3 ' '=3 l=4 e=5
//! match:  offset 3, length 2 (UTF-16)  ->  bytes 4..6 ("le")
//! ```
//!
//! Matches that cannot be re-anchored (past the end, or splitting a
//! surrogate pair) are dropped.

use serde::Deserialize;
use tracing::debug;

use crate::{MatchSpan, Result};

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Debug, Deserialize)]
struct WireMatch {
    offset: usize,
    length: usize,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    replacements: Vec<WireReplacement>,
    #[serde(default)]
    rule: Option<WireRule>,
}

#[derive(Debug, Deserialize)]
struct WireReplacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct WireRule {
    id: String,
}

/// Decode a `/v2/check` response for `text` into byte-offset spans.
///
/// # Errors
///
/// Returns [`Error::Decode`](crate::Error::Decode) if `json` is not a valid
/// check response.
///
/// ## Example
///
/// ```rust
/// use proofline::parse_check_response;
///
/// let json = r#"{"matches":[{"offset":2,"length":3,"replacements":[{"value":"have"}]}]}"#;
/// let spans = parse_check_response("I has a apple", json).unwrap();
/// assert_eq!(spans[0].offset, 2);
/// assert_eq!(spans[0].replacements, vec!["have"]);
/// ```
pub fn parse_check_response(text: &str, json: &str) -> Result<Vec<MatchSpan>> {
    let response: CheckResponse = serde_json::from_str(json)?;

    let spans = response
        .matches
        .into_iter()
        .filter_map(|m| {
            let start = utf16_to_byte(text, m.offset);
            let end = m.offset.checked_add(m.length).and_then(|e| utf16_to_byte(text, e));
            let (Some(start), Some(end)) = (start, end) else {
                debug!(offset = m.offset, length = m.length, "dropping unmappable match");
                return None;
            };
            Some(MatchSpan {
                offset: start,
                length: end - start,
                replacements: m.replacements.into_iter().map(|r| r.value).collect(),
                message: m.message,
                rule_id: m.rule.map(|r| r.id),
            })
        })
        .collect();

    Ok(spans)
}

/// Byte offset of the `units`-th UTF-16 code unit of `text`.
fn utf16_to_byte(text: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (idx, c) in text.char_indices() {
        if seen == units {
            return Some(idx);
        }
        if seen > units {
            return None;
        }
        seen += c.len_utf16();
    }
    (seen == units).then_some(text.len())
}

#[cfg(feature = "languagetool")]
pub use client::LanguageToolClient;

#[cfg(feature = "languagetool")]
mod client {
    use std::time::Duration;

    use crate::{Error, GrammarEngine, MatchSpan, Result};

    /// Blocking client for a LanguageTool HTTP server.
    ///
    /// `reqwest`'s blocking client must not be created or dropped inside an
    /// async context; build it before starting the runtime or inside
    /// `spawn_blocking`. Calls made by a [`Session`](crate::Session) already
    /// run on a blocking worker.
    #[derive(Debug, Clone)]
    pub struct LanguageToolClient {
        http: reqwest::blocking::Client,
        endpoint: String,
    }

    impl LanguageToolClient {
        /// Create a client for the server at `base_url`, e.g. `http://localhost:8081`.
        ///
        /// # Errors
        ///
        /// Returns [`Error::AnalysisService`] if the HTTP client cannot be built.
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
            let http = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| Error::AnalysisService(e.to_string()))?;
            Ok(Self {
                http,
                endpoint: format!("{}/v2/check", base_url.trim_end_matches('/')),
            })
        }
    }

    impl GrammarEngine for LanguageToolClient {
        fn check(&self, text: &str, locale: &str) -> Result<Vec<MatchSpan>> {
            let body = self
                .http
                .post(&self.endpoint)
                .form(&[("text", text), ("language", locale)])
                .send()
                .and_then(reqwest::blocking::Response::error_for_status)
                .and_then(reqwest::blocking::Response::text)
                .map_err(|e| Error::AnalysisService(e.to_string()))?;
            super::parse_check_response(text, &body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_ascii_offsets() {
        let json = r#"{
            "matches": [
                {"offset": 2, "length": 3, "message": "Verb agreement",
                 "replacements": [{"value": "have"}], "rule": {"id": "HAS_HAVE"}},
                {"offset": 6, "length": 1, "replacements": [{"value": "an"}, {"value": "the"}]}
            ]
        }"#;
        let spans = parse_check_response("I has a apple", json).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].message.as_deref(), Some("Verb agreement"));
        assert_eq!(spans[0].rule_id.as_deref(), Some("HAS_HAVE"));
        assert_eq!(spans[1], MatchSpan::new(6, 1, ["an", "the"]));
    }

    #[test]
    fn test_multibyte_offsets() {
        let json = r#"{"matches":[{"offset":3,"length":2,"replacements":[]}]}"#;
        let text = "né le";
        let spans = parse_check_response(text, json).unwrap();
        assert_eq!(&text[spans[0].range()], "le");
    }

    #[test]
    fn test_surrogate_pairs() {
        // The emoji is two UTF-16 units and four bytes.
        let text = "😀 teh";
        let json = r#"{"matches":[{"offset":3,"length":3,"replacements":[{"value":"the"}]}]}"#;
        let spans = parse_check_response(text, json).unwrap();
        assert_eq!(&text[spans[0].range()], "teh");

        let inside = r#"{"matches":[{"offset":1,"length":1}]}"#;
        assert!(parse_check_response(text, inside).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_dropped() {
        let json = r#"{"matches":[{"offset":4,"length":10}]}"#;
        assert!(parse_check_response("short", json).unwrap().is_empty());
    }

    #[test]
    fn test_no_matches() {
        assert!(parse_check_response("fine", "{}").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_check_response("x", "[1,"), Err(Error::Decode(_))));
    }
}
