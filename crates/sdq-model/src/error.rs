use thiserror::Error;

/// Errors raised when parsing model values from their textual form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("unknown clinical domain: {0}")]
    UnknownDomain(String),
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    #[error("unknown scenario tag: {0}")]
    UnknownTag(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
