use thiserror::Error;

/// A byte string or text that does not decode to a valid [`Identifier`].
///
/// [`Identifier`]: crate::Identifier
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("invalid identifier length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid identifier version: expected 7, got {0}")]
    InvalidVersion(u8),

    #[error("invalid identifier variant")]
    InvalidVariant,

    #[error("invalid identifier string: {0}")]
    InvalidString(String),
}
