use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blobguard_gate::GateError;
use blobguard_store::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found")]
    NotFound,

    #[error("forbidden")]
    Forbidden,

    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    /// The blob store failed before any byte was sent.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("no data from backend within {0:?}")]
    FirstByteTimeout(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Status and plain-text body sent to the caller.
    ///
    /// Only backend failures that carry a real status relay detail; every
    /// other unexpected failure is reduced to an opaque `error`.
    pub fn status_and_body(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "not found".into()),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden".into()),
            Self::Gate(e) if e.is_resolution() => (StatusCode::NOT_FOUND, "not found".into()),
            Self::Backend(BackendError {
                status_code: Some(code),
                message,
            }) => match StatusCode::from_u16(*code) {
                Ok(status) if status.is_client_error() || status.is_server_error() => {
                    (status, format!("backend error: {message}"))
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "error".into()),
            },
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "error".into()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        match &self {
            Self::NotFound | Self::Forbidden => {}
            Self::Gate(e) if e.is_resolution() => {}
            Self::Backend(e) if status != StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::warn!(status = status.as_u16(), error = %e, "backend failed before first byte");
            }
            other => tracing::error!(error = %other, "request failed"),
        }
        (status, body).into_response()
    }
}
