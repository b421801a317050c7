use std::path::{Path, PathBuf};

use async_trait::async_trait;
use blobguard_types::StorageKey;
use bytes::{Bytes, BytesMut};
use futures_util::stream;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::blob::{BlobStore, BlobStream};
use crate::error::BackendError;

/// Default read size for each chunk pulled from disk.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Blob store backed by files under a root directory.
///
/// A [`StorageKey`] is mapped onto the root segment by segment, so a key can
/// never address a path outside the root.
#[derive(Clone, Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    chunk_size: usize,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the per-chunk read size. Zero is clamped to one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute file path for a key.
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        let mut path = self.root.clone();
        for segment in key.segments() {
            path.push(segment);
        }
        path
    }
}

async fn read_chunk(
    mut file: File,
    chunk_size: usize,
) -> Result<Option<(Bytes, File)>, BackendError> {
    let mut buf = BytesMut::with_capacity(chunk_size);
    let n = file.read_buf(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some((buf.freeze(), file)))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn open_read_stream(&self, key: &StorageKey) -> Result<BlobStream, BackendError> {
        if key.is_empty() {
            return Err(BackendError::with_status(404, "not found"));
        }
        let path = self.path_for(key);
        let file = File::open(&path).await?;
        if file.metadata().await?.is_dir() {
            return Err(BackendError::with_status(404, "not found"));
        }
        debug!(path = %path.display(), "opened local blob");

        let chunk_size = self.chunk_size;
        let chunks = stream::try_unfold(file, move |file| read_chunk(file, chunk_size));
        Ok(Box::pin(chunks))
    }
}
