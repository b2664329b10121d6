use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] youknow_db::StorageError),
    #[error("ingest error: {0}")]
    Ingest(#[from] ingest::IngestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Failure classes surfaced through the status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    SourceUnavailable,
    MalformedSource,
    BackendUnreachable,
    Internal,
}

impl ErrorKind {
    pub fn of(err: &AppError) -> Self {
        match err {
            AppError::Ingest(ingest::IngestError::SourceUnavailable { .. }) => {
                Self::SourceUnavailable
            }
            AppError::Ingest(ingest::IngestError::MalformedSource { .. }) => Self::MalformedSource,
            AppError::Storage(_) => Self::BackendUnreachable,
            AppError::Io(_) | AppError::Serde(_) | AppError::InvalidInput(_) => Self::Internal,
        }
    }

    /// Stable machine-readable code used in API error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::MalformedSource => "malformed_source",
            Self::BackendUnreachable => "backend_unreachable",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let (status, code) = match &err {
            AppError::InvalidInput(_) => (400, "invalid_input"),
            other => match ErrorKind::of(other) {
                ErrorKind::Internal => (500, ErrorKind::Internal.code()),
                kind => (503, kind.code()),
            },
        };
        Self {
            status,
            message: err.to_string(),
            code: Some(code.to_string()),
        }
    }
}
