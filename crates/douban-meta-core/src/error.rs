use thiserror::Error;

/// Errors that can occur while building the core parsers.
///
/// Response parsing itself never fails: missing markup degrades to empty
/// fields or the not-found sentinel. These variants only surface when a
/// parser is constructed or an input is rejected up front.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The input string is empty or contains only whitespace.
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// A CSS selector failed to compile (should not happen with static selectors).
    #[error("invalid selector {selector:?}: {reason}")]
    Selector {
        /// The selector source text.
        selector: String,
        /// Parser message.
        reason: String,
    },

    /// A JSON payload could not be decoded.
    #[error("json decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, MetaError>;
