mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

pub use errors::HttpError;
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/dashboard", post(handlers::dashboard))
        .route("/refresh", post(handlers::refresh))
        .route("/status", post(handlers::status))
        .route("/source_check", post(handlers::source_check))
        .route("/health", get(handlers::health).post(handlers::health))
        .route_layer(axum_middleware::from_fn(middleware::require_loopback_origin));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}
