use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use blobguard_types::StorageKey;
use bytes::Bytes;
use futures_util::stream;

use crate::blob::{BlobStore, BlobStream};
use crate::error::BackendError;

/// A failure to replay when a blob is read.
#[derive(Clone, Debug)]
pub enum InjectedFailure {
    /// Opening the stream fails.
    OnOpen(BackendError),
    /// The stream yields `delivered` chunks, then fails.
    AfterChunks { delivered: usize, error: BackendError },
}

#[derive(Clone, Debug, Default)]
struct MemoryBlob {
    chunks: Vec<Bytes>,
    failure: Option<InjectedFailure>,
}

/// In-memory blob store holding each object as a list of chunks.
///
/// Intended for tests and embedding. Chunks are replayed exactly as stored,
/// which makes chunk-boundary behavior deterministic.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<StorageKey, MemoryBlob>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Store `data` as a single chunk.
    pub fn put(&self, key: &str, data: impl Into<Bytes>) {
        self.put_chunks(key, vec![data.into()]);
    }

    /// Store an object as an explicit list of chunks.
    pub fn put_chunks(&self, key: &str, chunks: Vec<Bytes>) {
        let mut map = self.blobs.write().expect("lock poisoned");
        map.insert(
            StorageKey::sanitize(key),
            MemoryBlob {
                chunks,
                failure: None,
            },
        );
    }

    /// Make subsequent reads of `key` fail. The key need not hold data.
    pub fn inject_failure(&self, key: &str, failure: InjectedFailure) {
        let mut map = self.blobs.write().expect("lock poisoned");
        map.entry(StorageKey::sanitize(key)).or_default().failure = Some(failure);
    }

    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn open_read_stream(&self, key: &StorageKey) -> Result<BlobStream, BackendError> {
        let blob = {
            let map = self.blobs.read().expect("lock poisoned");
            map.get(key).cloned()
        };
        let blob = blob.ok_or_else(|| BackendError::with_status(404, "not found"))?;

        let items: Vec<Result<Bytes, BackendError>> = match blob.failure {
            None => blob.chunks.into_iter().map(Ok).collect(),
            Some(InjectedFailure::OnOpen(err)) => return Err(err),
            Some(InjectedFailure::AfterChunks { delivered, error }) => blob
                .chunks
                .into_iter()
                .take(delivered)
                .map(Ok)
                .chain(std::iter::once(Err(error)))
                .collect(),
        };
        Ok(Box::pin(stream::iter(items)))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
