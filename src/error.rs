//! Error types for proofline.

use std::time::Duration;

/// Errors that can occur while analyzing or correcting text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The grammar or spelling engine reported a failure.
    #[error("analysis service error: {0}")]
    AnalysisService(String),

    /// The grammar engine did not answer within the configured limit.
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),

    /// A span does not describe a valid region of the text it was applied to.
    #[error("malformed span {offset}+{length} for text of {text_len} bytes")]
    MalformedSpan {
        /// Byte offset of the span.
        offset: usize,
        /// Byte length of the span.
        length: usize,
        /// Length of the text the span was checked against.
        text_len: usize,
    },

    /// A normalization rule pattern failed to compile.
    #[error("invalid normalization rule {name}: {source}")]
    InvalidRule {
        /// The rule name.
        name: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An engine payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The blocking worker running an engine call panicked or was cancelled.
    #[error("analysis worker stopped unexpectedly")]
    WorkerPanicked,

    /// The session event loop is no longer running.
    #[error("session closed")]
    SessionClosed,
}

/// Result type for proofline operations.
pub type Result<T> = std::result::Result<T, Error>;
