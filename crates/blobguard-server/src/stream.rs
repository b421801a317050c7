use std::io;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use blobguard_store::{BackendError, BlobStore, BlobStream};
use blobguard_types::StorageKey;
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use tracing::{debug, warn};

use crate::content_type::content_type_for;
use crate::error::{ServerError, ServerResult};

/// Stream a stored object to the caller.
///
/// The stream is opened and its first chunk pulled before any header is
/// committed, so a failure up to that point still becomes a proper status.
/// A failure after that point aborts the body: the caller sees a truncated
/// transfer and nothing is appended. Chunks are relayed as they arrive and
/// dropping the response drops the backend stream.
pub async fn stream_object(
    store: &dyn BlobStore,
    key: &StorageKey,
    extension: &str,
    first_byte_timeout: Option<Duration>,
) -> ServerResult<Response> {
    let content_type = content_type_for(extension);
    let opened = open_with_first_chunk(store, key);
    let (first, rest) = match first_byte_timeout {
        Some(limit) => tokio::time::timeout(limit, opened)
            .await
            .map_err(|_| ServerError::FirstByteTimeout(limit))??,
        None => opened.await?,
    };

    let body = match first {
        Some(chunk) => Body::from_stream(relay(key.clone(), chunk, rest)),
        None => Body::empty(),
    };
    debug!(key = %key, content_type, "streaming object");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .map_err(|e| ServerError::Internal(e.to_string()))
}

async fn open_with_first_chunk(
    store: &dyn BlobStore,
    key: &StorageKey,
) -> Result<(Option<Bytes>, BlobStream), BackendError> {
    let mut stream = store.open_read_stream(key).await?;
    match stream.next().await {
        Some(Ok(chunk)) => Ok((Some(chunk), stream)),
        Some(Err(e)) => Err(e),
        None => Ok((None, stream)),
    }
}

fn relay(
    key: StorageKey,
    first: Bytes,
    rest: BlobStream,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
    let rest = rest.map(move |item| {
        item.map_err(|e| {
            // Headers are committed; all that is left is to cut the body short.
            warn!(key = %key, error = %e, "backend failed mid-stream, truncating response");
            io::Error::other(e)
        })
    });
    stream::iter(std::iter::once(Ok(first))).chain(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blobguard_store::{InMemoryBlobStore, InjectedFailure};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn key(s: &str) -> StorageKey {
        StorageKey::sanitize(s)
    }

    fn chunks(n: u8) -> Vec<Bytes> {
        (0..n).map(|i| Bytes::from(vec![b'a' + i; 3])).collect()
    }

    #[tokio::test]
    async fn streams_all_chunks() {
        let store = InMemoryBlobStore::new();
        store.put_chunks("a/b.png", chunks(3));
        let response = stream_object(&store, &key("a/b.png"), "png", None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"aaabbbccc");
    }

    #[tokio::test]
    async fn empty_object_is_empty_200() {
        let store = InMemoryBlobStore::new();
        store.put_chunks("empty", Vec::new());
        let response = stream_object(&store, &key("empty"), "", None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octet-stream");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn open_failure_before_first_byte() {
        let store = InMemoryBlobStore::new();
        store.inject_failure("x", InjectedFailure::OnOpen(BackendError::with_status(403, "access denied")));
        let err = stream_object(&store, &key("x"), "", None).await.unwrap_err();
        assert!(matches!(err, ServerError::Backend(BackendError { status_code: Some(403), .. })));
    }

    #[tokio::test]
    async fn first_chunk_failure_is_reported() {
        let store = InMemoryBlobStore::new();
        store.put_chunks("x", chunks(4));
        store.inject_failure(
            "x",
            InjectedFailure::AfterChunks {
                delivered: 0,
                error: BackendError::with_status(503, "slow down"),
            },
        );
        let err = stream_object(&store, &key("x"), "", None).await.unwrap_err();
        assert_eq!(err.status_and_body().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn mid_stream_failure_truncates() {
        let store = InMemoryBlobStore::new();
        store.put_chunks("x", chunks(10));
        store.inject_failure(
            "x",
            InjectedFailure::AfterChunks {
                delivered: 2,
                error: BackendError::with_status(500, "connection reset"),
            },
        );
        let response = stream_object(&store, &key("x"), "bin", None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut data = response.into_body().into_data_stream();
        assert_eq!(data.next().await.unwrap().unwrap(), Bytes::from_static(b"aaa"));
        assert_eq!(data.next().await.unwrap().unwrap(), Bytes::from_static(b"bbb"));
        assert!(data.next().await.unwrap().is_err());
    }

    struct ReleaseTracking {
        released: Arc<AtomicBool>,
    }

    struct ReleaseFlag(Arc<AtomicBool>);

    impl Drop for ReleaseFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl BlobStore for ReleaseTracking {
        async fn open_read_stream(&self, _key: &StorageKey) -> Result<BlobStream, BackendError> {
            let flag = ReleaseFlag(self.released.clone());
            let items = stream::iter(chunks(10).into_iter().map(Ok)).map(move |item| {
                let _ = &flag;
                item
            });
            Ok(Box::pin(items))
        }
    }

    #[tokio::test]
    async fn dropping_response_releases_backend() {
        let released = Arc::new(AtomicBool::new(false));
        let store = ReleaseTracking {
            released: released.clone(),
        };
        let response = stream_object(&store, &key("x"), "", None).await.unwrap();
        let mut data = response.into_body().into_data_stream();
        assert!(data.next().await.unwrap().is_ok());
        assert!(!released.load(Ordering::SeqCst));

        drop(data);
        assert!(released.load(Ordering::SeqCst));
    }

    struct Stalled;

    #[async_trait]
    impl BlobStore for Stalled {
        async fn open_read_stream(&self, _key: &StorageKey) -> Result<BlobStream, BackendError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Err(BackendError::other("unreachable"))
        }
    }

    #[tokio::test]
    async fn first_byte_timeout_fails_closed() {
        let limit = Duration::from_millis(20);
        let err = stream_object(&Stalled, &key("x"), "", Some(limit)).await.unwrap_err();
        assert!(matches!(err, ServerError::FirstByteTimeout(_)));
        assert_eq!(err.status_and_body().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
