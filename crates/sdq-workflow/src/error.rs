use sdq_client::ClientError;
use sdq_generate::GenerateError;
use sdq_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkflowError {
    #[error("no DRP scenarios loaded")]
    NoDrpBatch,

    #[error("no scenarios selected")]
    EmptySelection,

    #[error("selection {index} is out of range ({available} suggestions available)")]
    SelectionOutOfRange { index: usize, available: usize },

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Template(#[from] GenerateError),

    #[error("backend request failed: {0}")]
    Backend(#[from] ClientError),
}

impl WorkflowError {
    /// Backend failures leave the session untouched and can be retried.
    pub fn is_recoverable(&self) -> bool {
        match self {
            WorkflowError::Backend(err) => err.is_recoverable(),
            WorkflowError::Ingest(_) | WorkflowError::Template(_) => false,
            _ => true,
        }
    }

    pub fn suggestion(&self) -> Option<String> {
        match self {
            WorkflowError::NoDrpBatch => Some("Load a DRP file first.".to_string()),
            WorkflowError::EmptySelection => {
                Some("Select at least one suggested scenario to add to the study.".to_string())
            }
            WorkflowError::Ingest(err) => err.suggestion(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;
