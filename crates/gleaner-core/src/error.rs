//! Error types for extraction pipelines

use thiserror::Error;

/// Errors produced while running an extraction pipeline.
///
/// These are routinely carried *inside* [`Record`](crate::Record)s rather
/// than returned through `Result` chains: a failing sub-extractor becomes
/// one error-valued record and its siblings keep running. Variants carry
/// owned strings so records stay cheap to clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// A leaf extractor or pipeline step failed
    #[error("Extraction failed: {0}")]
    Failed(String),

    /// The input could not be read
    #[error("Read error: {0}")]
    Read(String),

    /// A value did not have the shape a step expected
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl ExtractError {
    /// Shorthand for [`ExtractError::Failed`]
    pub fn failed(message: impl Into<String>) -> Self {
        ExtractError::Failed(message.into())
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        ExtractError::Read(e.to_string())
    }
}
