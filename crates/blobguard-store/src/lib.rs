//! Storage collaborators for blobguard.
//!
//! Two read-only seams are defined here:
//!
//! - [`BlobStore`] -- opens a sequential byte stream for a [`StorageKey`]
//! - [`ObjectMetadataStore`] -- looks up a [`StoredObject`] by id
//!
//! # Backends
//!
//! - [`LocalBlobStore`] -- files under a root directory, read in bounded chunks
//! - [`InMemoryBlobStore`] -- chunk lists with failure injection, for tests
//! - [`InMemoryObjectCatalog`] -- `HashMap`-based metadata with the
//!   attach/discard/detach mutations the document editor performs
//!
//! # Design Rules
//!
//! 1. Streams are pulled, never buffered whole; memory use is bounded by chunk size.
//! 2. Dropping a stream releases the backend handle.
//! 3. Backend failures carry an optional structured status code.
//! 4. Concurrent reads are always safe.
//!
//! [`StorageKey`]: blobguard_types::StorageKey
//! [`StoredObject`]: blobguard_types::StoredObject

pub mod blob;
pub mod catalog;
pub mod error;
pub mod local;
pub mod memory;

pub use blob::{BlobStore, BlobStream};
pub use catalog::{InMemoryObjectCatalog, ObjectMetadataStore};
pub use error::{BackendError, StoreError, StoreResult};
pub use local::LocalBlobStore;
pub use memory::{InMemoryBlobStore, InjectedFailure};
