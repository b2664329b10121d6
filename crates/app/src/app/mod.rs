use std::path::PathBuf;
use std::sync::Arc;

use youknow_db::{StorageConfig, StorageSelection, select_storage};

use crate::config::PipelineConfig;
use crate::pipeline::PipelineCoordinator;
use crate::services::AppServices;

/// Paths and settings needed to run the pipeline.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Explicit history file; default browser locations are searched when unset.
    pub history_path: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            backend: self.pipeline.storage,
            db_path: self.db_path.clone(),
        }
    }
}

/// Application state shared by the HTTP server and the scheduler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub coordinator: Arc<PipelineCoordinator>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let storage = select_storage(&config.storage());
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: AppConfig, storage: StorageSelection) -> Self {
        let config = Arc::new(config);
        let coordinator = Arc::new(PipelineCoordinator::new(config.clone(), storage));
        let services = AppServices::new(config.clone(), coordinator.clone());
        Self {
            config,
            coordinator,
            services,
        }
    }

    /// Restores the last persisted cycle so reads are not empty before the first run.
    pub fn initialize(&self) {
        match self.coordinator.restore() {
            Ok(true) => {}
            Ok(false) => tracing::debug!("no persisted cycle to restore"),
            Err(err) => tracing::warn!(%err, "could not restore persisted results"),
        }
    }
}
