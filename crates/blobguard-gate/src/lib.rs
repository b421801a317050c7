//! Path resolution and access control for blobguard.
//!
//! A request path flows through two stages before any bytes are read:
//!
//! 1. [`PathResolver`] sanitizes the raw path into a [`StorageKey`] and, for
//!    paths in the guarded namespace, extracts the [`ObjectId`].
//! 2. [`AccessGuard`] decides [`AccessDecision`] for guarded paths by asking
//!    the [`DocumentVisibility`] collaborator whether the principal can see
//!    any document referencing the object.
//!
//! # Quick Start
//!
//! ```rust
//! use blobguard_gate::PathResolver;
//!
//! let resolved = PathResolver::default()
//!     .resolve("attachments/abc123-photo.jpg")
//!     .unwrap();
//! assert_eq!(resolved.guarded_object_id.unwrap().as_str(), "abc123");
//! assert_eq!(resolved.extension, "jpg");
//! ```
//!
//! [`StorageKey`]: blobguard_types::StorageKey
//! [`ObjectId`]: blobguard_types::ObjectId
//! [`AccessDecision`]: blobguard_types::AccessDecision

pub mod error;
pub mod guard;
pub mod resolve;
pub mod visibility;

pub use error::{GateError, GateResult};
pub use guard::AccessGuard;
pub use resolve::{extension_of, PathResolver, ResolvedPath, DEFAULT_GUARDED_NAMESPACE};
pub use visibility::{DocumentRecord, DocumentVisibility, InMemoryDocumentDirectory, VisibilityQuery};
