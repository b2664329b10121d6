pub mod app;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod startup;

pub use app::{AppConfig, AppState};
pub use config::{DashboardParams, MAX_RETENTION_DAYS, MAX_WINDOW_DAYS, PipelineConfig};
pub use error::{ApiError, AppError, ErrorKind, Result};
pub use pipeline::{
    CycleReport, PipelineCoordinator, PipelineState, PipelineStatus, Published, RunResult,
};
pub use services::{AppServices, SourceCheck};
pub use startup::{AppPaths, ensure_app_data_dir};
