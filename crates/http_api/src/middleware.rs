use axum::{
    body::Body,
    http::{Request, StatusCode, header::ORIGIN},
    middleware::Next,
    response::Response,
};

use crate::errors::HttpError;

/// Rejects browser requests coming from any page not served on this machine.
///
/// Requests without an `Origin` header (curl, the scheduler, tests) pass.
pub async fn require_loopback_origin(req: Request<Body>, next: Next) -> Result<Response, HttpError> {
    if let Some(origin) = req.headers().get(ORIGIN) {
        let origin = origin.to_str().map_err(|_| {
            HttpError::rejected(StatusCode::BAD_REQUEST, "invalid_origin", "invalid Origin header")
        })?;
        if !is_loopback_origin(origin) {
            tracing::warn!(origin, path = %req.uri().path(), "rejected cross-origin request");
            return Err(HttpError::rejected(
                StatusCode::FORBIDDEN,
                "invalid_origin",
                "invalid origin",
            ));
        }
    }
    Ok(next.run(req).await)
}

fn is_loopback_origin(origin: &str) -> bool {
    let Some((scheme, rest)) = origin.split_once("://") else {
        return false;
    };
    if scheme != "http" && scheme != "https" {
        return false;
    }
    let host = match rest.strip_prefix("[::1]") {
        Some(tail) => return tail.is_empty() || tail.starts_with(':'),
        None => rest.split(':').next().unwrap_or(rest),
    };
    host == "127.0.0.1" || host == "localhost"
}
