use blobguard_store::StoreError;

/// Errors that can occur while resolving or authorizing a request.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// A guarded path is malformed. Callers surface this as not found.
    #[error("unresolvable path: {0}")]
    Resolution(String),

    /// The object metadata lookup failed.
    #[error("metadata lookup failed: {0}")]
    Metadata(#[from] StoreError),

    /// The document visibility collaborator failed.
    #[error("visibility check failed: {0}")]
    Visibility(String),
}

impl GateError {
    /// Returns `true` for the expected, not-found-class failures.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }
}

/// Result alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;
