use youknow_app::{DashboardParams, PipelineStatus, Result, RunResult, SourceCheck};
use youknow_core::Dashboard;

use crate::{AppContext, DashboardRequest, HealthResponse, SERVICE_NAME};

pub fn dashboard(ctx: &AppContext, req: DashboardRequest) -> Result<Dashboard> {
    ctx.app_state
        .services
        .dashboard
        .dashboard(&DashboardParams { days: req.days })
}

/// Runs or joins a cycle. Blocks the calling thread until a report exists.
pub fn refresh(ctx: &AppContext) -> RunResult {
    ctx.app_state.services.pipeline.refresh()
}

pub fn status(ctx: &AppContext) -> PipelineStatus {
    ctx.app_state.services.pipeline.status()
}

pub fn source_check(ctx: &AppContext) -> SourceCheck {
    ctx.app_state.services.source.check()
}

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
    }
}
