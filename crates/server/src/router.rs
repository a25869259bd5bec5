use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = app_state.config.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route(
            "/processar_cupom",
            post(handlers::process_receipt_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
