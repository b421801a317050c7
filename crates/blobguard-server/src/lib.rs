//! HTTP front for blobguard.
//!
//! Serves stored objects under a guarded route. Each request is resolved,
//! authorized against the documents that reference the object, and then
//! streamed from the blob store with a content type derived from the file
//! extension.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod content_type;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;
pub mod stream;

pub use auth::{AnonymousAuth, AuthProvider, Credentials, StaticTokenAuth};
pub use catalog::CatalogFile;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::BlobGuardServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use blobguard_gate::{AccessGuard, DocumentRecord, InMemoryDocumentDirectory};
    use blobguard_store::{BackendError, InMemoryBlobStore, InMemoryObjectCatalog, InjectedFailure};
    use blobguard_types::ObjectId;
    use bytes::Bytes;
    use futures_util::StreamExt;
    use tower::util::ServiceExt;

    const PHOTO: &str = "attachments/abc123-photo.jpg";

    struct Fixture {
        objects: Arc<InMemoryObjectCatalog>,
        documents: Arc<InMemoryDocumentDirectory>,
        blobs: Arc<InMemoryBlobStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let fixture = Self {
                objects: Arc::new(InMemoryObjectCatalog::new()),
                documents: Arc::new(InMemoryDocumentDirectory::new()),
                blobs: Arc::new(InMemoryBlobStore::new()),
            };
            fixture.objects.insert_upload(oid("abc123"));
            fixture.blobs.put(PHOTO, Bytes::from_static(b"\xff\xd8jpeg-bytes"));
            fixture
        }

        fn app(&self) -> Router {
            let config = ServerConfig::default();
            let guard = AccessGuard::new(self.objects.clone(), self.documents.clone());
            let auth = Arc::new(StaticTokenAuth::new(HashMap::from([
                ("tok-alice".to_string(), "alice".to_string()),
                ("tok-bob".to_string(), "bob".to_string()),
            ])));
            router::build_router(AppState::new(&config, guard, self.blobs.clone(), auth))
        }
    }

    fn oid(s: &str) -> ObjectId {
        ObjectId::parse(s).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = Fixture::new().app().oneshot(get("/health", None)).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn unutilized_object_is_served() {
        let response = Fixture::new()
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\xff\xd8jpeg-bytes");
    }

    #[tokio::test]
    async fn utilized_object_invisible_document_is_forbidden() {
        let fixture = Fixture::new();
        fixture.objects.attach(&oid("abc123"), "D1".into()).unwrap();
        fixture.documents.upsert(DocumentRecord::new("D1").with_viewer("alice"));

        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", Some("tok-bob")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "forbidden");
    }

    #[tokio::test]
    async fn utilized_object_visible_document_is_served() {
        let fixture = Fixture::new();
        fixture.objects.attach(&oid("abc123"), "A".into()).unwrap();
        fixture.objects.attach(&oid("abc123"), "B".into()).unwrap();
        fixture.documents.upsert(DocumentRecord::new("A").with_viewer("alice"));
        fixture.documents.upsert(DocumentRecord::new("B").with_viewer("bob"));

        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", Some("tok-bob")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_object_is_not_found() {
        let response = Fixture::new()
            .app()
            .oneshot(get("/secure-uploads/attachments/zzz-missing.png", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "not found");
    }

    #[tokio::test]
    async fn malformed_guarded_path_is_not_found() {
        let app = Fixture::new().app();
        let response = app
            .clone()
            .oneshot(get("/secure-uploads/attachments/abc123.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/secure-uploads/attachments", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "not found");
    }

    #[tokio::test]
    async fn traversal_cannot_bypass_guard() {
        let fixture = Fixture::new();
        fixture.objects.attach(&oid("abc123"), "D1".into()).unwrap();
        fixture.documents.upsert(DocumentRecord::new("D1").with_viewer("alice"));

        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/../attachments/abc123-photo.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unguarded_path_skips_guard() {
        let fixture = Fixture::new();
        fixture.blobs.put("css/site.css", Bytes::from_static(b"body{}"));
        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/css/site.css", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn backend_status_relayed_before_first_byte() {
        let fixture = Fixture::new();
        fixture.blobs.inject_failure(
            PHOTO,
            InjectedFailure::AfterChunks {
                delivered: 0,
                error: BackendError::with_status(503, "service unavailable"),
            },
        );
        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body_text(response).await, "backend error: service unavailable");
    }

    #[tokio::test]
    async fn backend_failure_after_two_chunks_truncates() {
        let fixture = Fixture::new();
        let chunks: Vec<Bytes> = (0..10u8).map(|i| Bytes::from(vec![i; 4])).collect();
        fixture.blobs.put_chunks(PHOTO, chunks.clone());
        fixture.blobs.inject_failure(
            PHOTO,
            InjectedFailure::AfterChunks {
                delivered: 2,
                error: BackendError::other("connection reset"),
            },
        );
        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut data = response.into_body().into_data_stream();
        let mut delivered = Vec::new();
        let mut failed = false;
        while let Some(item) = data.next().await {
            match item {
                Ok(chunk) => delivered.push(chunk),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        assert!(failed);
        assert_eq!(delivered, chunks[..2].to_vec());
    }

    #[tokio::test]
    async fn missing_blob_is_relayed_404() {
        let fixture = Fixture::new();
        fixture.objects.insert_upload(oid("nofile"));
        let response = fixture
            .app()
            .oneshot(get("/secure-uploads/attachments/nofile-x.pdf", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn legacy_route_redirects_into_guard() {
        let response = Fixture::new()
            .app()
            .oneshot(get("/uploads/attachments/abc123-photo.jpg?v=2", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/secure-uploads/attachments/abc123-photo.jpg?v=2"
        );
    }

    #[tokio::test]
    async fn bare_prefix_is_not_found() {
        let app = Fixture::new().app();
        for uri in ["/secure-uploads/", "/secure-uploads", "/secure-uploads/./..", "/elsewhere/file.txt"] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body_text(response).await, "not found", "{uri}");
        }
    }

    /// Holds reads of one key until released; every other key is served
    /// straight from memory.
    struct GatedBlobStore {
        inner: Arc<InMemoryBlobStore>,
        held_key: &'static str,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait::async_trait]
    impl blobguard_store::BlobStore for GatedBlobStore {
        async fn open_read_stream(
            &self,
            key: &blobguard_types::StorageKey,
        ) -> Result<blobguard_store::BlobStream, BackendError> {
            if key.as_str() == self.held_key {
                self.release.notified().await;
            }
            self.inner.open_read_stream(key).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stalled_read_does_not_block_other_requests() {
        let fixture = Fixture::new();
        fixture.blobs.put("slow/archive.bin", Bytes::from_static(b"slow"));
        let release = Arc::new(tokio::sync::Notify::new());
        let blobs = Arc::new(GatedBlobStore {
            inner: fixture.blobs.clone(),
            held_key: "slow/archive.bin",
            release: release.clone(),
        });
        let guard = AccessGuard::new(fixture.objects.clone(), fixture.documents.clone());
        let state = AppState::new(&ServerConfig::default(), guard, blobs, Arc::new(AnonymousAuth));
        let app = router::build_router(state);

        let stalled = tokio::spawn(app.clone().oneshot(get("/secure-uploads/slow/archive.bin", None)));

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            app.oneshot(get("/secure-uploads/attachments/abc123-photo.jpg", None)),
        )
        .await
        .expect("normal request finished while the other read was held")
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"\xff\xd8jpeg-bytes");
        assert!(!stalled.is_finished());

        release.notify_one();
        let response = stalled.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "slow");
    }
}
