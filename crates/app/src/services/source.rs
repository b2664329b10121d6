use ingest::SourceProbe;
use serde::Serialize;

use crate::services::SharedConfig;

/// Where the history store was found and what it holds.
#[derive(Debug, Clone, Serialize)]
pub struct SourceCheck {
    pub configured: Option<String>,
    pub located: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe: Option<SourceProbe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Locations searched when no path is configured.
    pub candidates: Vec<String>,
}

#[derive(Clone)]
pub struct SourceService {
    config: SharedConfig,
}

impl SourceService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    pub fn check(&self) -> SourceCheck {
        let configured = self.config.history_path.as_deref();
        let candidates = match configured {
            Some(_) => Vec::new(),
            None => ingest::default_history_candidates()
                .iter()
                .map(|path| path.display().to_string())
                .collect(),
        };
        match ingest::locate_history(configured) {
            Ok(path) => SourceCheck {
                configured: configured.map(|path| path.display().to_string()),
                located: Some(path.display().to_string()),
                probe: Some(ingest::probe_history(&path)),
                error: None,
                candidates,
            },
            Err(err) => SourceCheck {
                configured: configured.map(|path| path.display().to_string()),
                located: None,
                probe: None,
                error: Some(err.to_string()),
                candidates,
            },
        }
    }
}
