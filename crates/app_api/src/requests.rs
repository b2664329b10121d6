use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

#[derive(Debug, Deserialize, Default)]
pub struct DashboardRequest {
    /// Window length in days; the service default applies when absent.
    pub days: Option<i64>,
}
