use axum::extract::{Path, State};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Json, Redirect, Response};
use blobguard_types::AccessDecision;
use serde_json::json;

use crate::auth::Credentials;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use crate::stream::stream_object;

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "name": "blobguard-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Serve a stored object after resolving and, for guarded paths,
/// authorizing it.
pub async fn serve_object(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> ServerResult<Response> {
    let resolved = state.resolver.resolve(&path)?;
    if resolved.storage_key.is_empty() {
        return Err(ServerError::NotFound);
    }

    if let Some(id) = &resolved.guarded_object_id {
        let credentials = Credentials::from_headers(&headers);
        let principal = state.auth.authenticate(&credentials).await?;
        match state.guard.authorize(&principal, id).await? {
            AccessDecision::Allow => {}
            AccessDecision::Forbidden => return Err(ServerError::Forbidden),
            AccessDecision::NotFound => return Err(ServerError::NotFound),
        }
    }

    stream_object(
        state.blobs.as_ref(),
        &resolved.storage_key,
        &resolved.extension,
        state.first_byte_timeout,
    )
    .await
}

/// Redirect an old public URL onto the guarded route, keeping the rest of
/// the path and query untouched so the request re-enters the guard.
pub async fn redirect_legacy(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(legacy) = state.legacy_prefix.as_deref() else {
        return ServerError::NotFound.into_response();
    };
    let rest = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    match rest.strip_prefix(legacy) {
        Some(tail) => Redirect::temporary(&format!("{}{tail}", state.route_prefix)).into_response(),
        None => ServerError::NotFound.into_response(),
    }
}
