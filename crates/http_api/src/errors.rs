use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use youknow_app::{ApiError, AppError};

/// Failure of an HTTP request, rendered as an [`ApiError`] body.
#[derive(Debug)]
pub enum HttpError {
    /// The pipeline or query surface failed; status follows its `ErrorKind`.
    App(AppError),
    /// Refused by the HTTP layer before reaching the app.
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl HttpError {
    pub fn rejected(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code,
            message: message.into(),
        }
    }
}

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::App(err) => {
                if matches!(err, AppError::Io(_) | AppError::Serde(_)) {
                    tracing::error!(%err, "request failed");
                }
                ApiError::from(err)
            }
            Self::Rejected {
                status,
                code,
                message,
            } => ApiError {
                status: status.as_u16(),
                message,
                code: Some(code.to_string()),
            },
        };
        let status =
            StatusCode::from_u16(body.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
