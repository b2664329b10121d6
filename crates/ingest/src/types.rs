use std::path::PathBuf;

use serde::Serialize;

/// Summary of one history read, reported back to the coordinator.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub source_path: String,
    pub visits_read: usize,
    pub snapshot_bytes: u64,
}

/// Result of checking a history file without running a full cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SourceProbe {
    pub path: String,
    pub accessible: bool,
    pub size_bytes: u64,
    pub url_count: Option<u64>,
    pub visit_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors emitted while reading a history snapshot.
#[derive(Debug)]
pub enum IngestError {
    /// The snapshot is missing, unreadable or could not be copied.
    SourceUnavailable { path: PathBuf, reason: String },
    /// The snapshot was copied but does not look like a browser history store.
    MalformedSource { path: PathBuf, reason: String },
}

impl IngestError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedSource {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceUnavailable { path, reason } => {
                write!(f, "history unavailable at {}: {}", path.display(), reason)
            }
            Self::MalformedSource { path, reason } => {
                write!(f, "malformed history at {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for IngestError {}

pub type Result<T> = std::result::Result<T, IngestError>;
