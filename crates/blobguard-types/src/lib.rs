//! Foundation types for blobguard.
//!
//! This crate provides the identifiers and records shared by every other
//! blobguard crate. It performs no I/O.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Opaque identifier of a stored object (an upload)
//! - [`DocumentId`] -- Identifier of a document that may reference objects
//! - [`Principal`] -- The identity a request is evaluated as
//! - [`StoredObject`] -- Reference metadata for a stored object
//! - [`StorageKey`] -- Sanitized relative path into the blob namespace
//! - [`AccessDecision`] -- Outcome of an authorization check

pub mod decision;
pub mod error;
pub mod ids;
pub mod key;
pub mod object;
pub mod principal;

pub use decision::AccessDecision;
pub use error::TypeError;
pub use ids::{DocumentId, ObjectId};
pub use key::StorageKey;
pub use object::StoredObject;
pub use principal::Principal;
