use youknow_core::Dashboard;

use crate::config::DashboardParams;
use crate::error::Result;
use crate::services::SharedCoordinator;

pub const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Clone)]
pub struct DashboardService {
    coordinator: SharedCoordinator,
}

impl DashboardService {
    pub(super) fn new(coordinator: SharedCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn dashboard(&self, params: &DashboardParams) -> Result<Dashboard> {
        self.coordinator
            .dashboard(params.days.unwrap_or(DEFAULT_WINDOW_DAYS))
    }
}
