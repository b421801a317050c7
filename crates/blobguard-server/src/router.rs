use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::handler;
use crate::state::AppState;

/// Build the axum router. The hosting application calls this once at startup.
///
/// Unmatched paths, including the bare route prefix, answer with the same
/// plain-text 404 as a missing object.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handler::health_handler))
        .route(&format!("{}/*path", state.route_prefix), get(handler::serve_object));
    if let Some(legacy) = &state.legacy_prefix {
        router = router.route(&format!("{legacy}/*path"), get(handler::redirect_legacy));
    }
    router
        .fallback(|| async { ServerError::NotFound })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
