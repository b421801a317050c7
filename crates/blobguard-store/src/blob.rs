use std::pin::Pin;

use async_trait::async_trait;
use blobguard_types::StorageKey;
use bytes::Bytes;
use futures_util::Stream;

use crate::error::BackendError;

/// A sequential stream of data chunks read from a blob store.
///
/// Dropping the stream must release the underlying handle.
pub type BlobStream = Pin<Box<dyn Stream<Item = Result<Bytes, BackendError>> + Send>>;

/// Read side of a binary object store.
///
/// Implementations are shared across concurrent requests and must not block
/// the runtime while waiting on I/O.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a read stream for `key`.
    ///
    /// Returns `Err` when the object cannot be opened. Read failures after
    /// opening are reported as `Err` items on the stream.
    async fn open_read_stream(&self, key: &StorageKey) -> Result<BlobStream, BackendError>;
}
