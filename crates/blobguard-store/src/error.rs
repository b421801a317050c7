use std::io;

use blobguard_types::{DocumentId, ObjectId};

/// Errors from object metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A mutation referenced an object that is not in the catalog.
    #[error("unknown object: {0}")]
    UnknownObject(ObjectId),

    /// A mutation referenced a document the object is not attached to.
    #[error("object {object} is not referenced by document {document}")]
    NotReferenced { object: ObjectId, document: DocumentId },

    /// The metadata backend could not be reached or answered with garbage.
    #[error("metadata backend unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for metadata operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A blob store failure while opening or reading a stream.
///
/// `status_code` is set when the backend reports a structured status, for
/// example an object-storage HTTP status.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub status_code: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn with_status(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }
}

impl From<io::Error> for BackendError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::with_status(404, "not found"),
            io::ErrorKind::PermissionDenied => Self::with_status(403, "permission denied"),
            _ => Self::other(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_404() {
        let err = BackendError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.status_code, Some(404));
    }

    #[test]
    fn other_io_has_no_status() {
        let err = BackendError::from(io::Error::other("disk on fire"));
        assert_eq!(err.status_code, None);
        assert_eq!(err.to_string(), "disk on fire");
    }
}
