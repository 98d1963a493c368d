use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    #[error("invalid EDC base URL '{url}': {source}")]
    InvalidEdcUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("EDC base URL cannot carry a path: {0}")]
    EdcUrlNotHierarchical(String),

    #[error("failed to serialize integration payload: {0}")]
    Payload(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GenerateError>;
