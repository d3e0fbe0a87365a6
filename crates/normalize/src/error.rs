use thiserror::Error;

/// Fatal pipeline outcomes. Everything recoverable is a `Diagnostic` instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("failed to parse graph data: {message}")]
    GraphParse { message: String },

    /// Only raised when `NormalizerConfig::strict_shape` is set.
    #[error("graph data must contain `nodes` and `edges` arrays")]
    InvalidGraphShape,
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
