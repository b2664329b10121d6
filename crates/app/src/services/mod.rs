mod dashboard;
mod pipeline;
mod source;

use std::sync::Arc;

use crate::app::AppConfig;
use crate::pipeline::PipelineCoordinator;

pub use dashboard::DashboardService;
pub use pipeline::PipelineService;
pub use source::{SourceCheck, SourceService};

type SharedConfig = Arc<AppConfig>;
type SharedCoordinator = Arc<PipelineCoordinator>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub dashboard: DashboardService,
    pub pipeline: PipelineService,
    pub source: SourceService,
}

impl AppServices {
    pub fn new(config: SharedConfig, coordinator: SharedCoordinator) -> Self {
        Self {
            dashboard: DashboardService::new(coordinator.clone()),
            pipeline: PipelineService::new(coordinator),
            source: SourceService::new(config),
        }
    }
}
