use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use app_api::{DashboardRequest, EmptyRequest};

use crate::{errors::HttpError, state::HttpState};

pub async fn dashboard(
    State(state): State<HttpState>,
    Json(req): Json<DashboardRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = app_api::dashboard(&state.context, req)?;
    Ok(Json(response))
}

/// A refresh may wait on a whole cycle, so it runs on the blocking pool.
pub async fn refresh(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let context = state.context.clone();
    let response = tokio::task::spawn_blocking(move || app_api::refresh(&context))
        .await
        .map_err(|err| {
            HttpError::rejected(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                format!("refresh task failed: {}", err),
            )
        })?;
    Ok(Json(response))
}

pub async fn status(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(app_api::status(&state.context)))
}

pub async fn source_check(
    State(state): State<HttpState>,
    Json(_): Json<EmptyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    Ok(Json(app_api::source_check(&state.context)))
}

pub async fn health() -> impl IntoResponse {
    Json(app_api::health())
}

pub async fn not_found() -> HttpError {
    HttpError::rejected(StatusCode::NOT_FOUND, "not_found", "not found")
}
