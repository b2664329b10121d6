use crate::pipeline::{PipelineStatus, RunResult};
use crate::services::SharedCoordinator;

#[derive(Clone)]
pub struct PipelineService {
    coordinator: SharedCoordinator,
}

impl PipelineService {
    pub(super) fn new(coordinator: SharedCoordinator) -> Self {
        Self { coordinator }
    }

    /// Blocks until a cycle result is available.
    pub fn refresh(&self) -> RunResult {
        self.coordinator.force_refresh()
    }

    pub fn run_scheduled(&self) -> RunResult {
        self.coordinator.run_cycle()
    }

    pub fn status(&self) -> PipelineStatus {
        self.coordinator.status()
    }
}
