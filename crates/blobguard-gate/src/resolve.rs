use blobguard_types::{ObjectId, StorageKey};
use serde::{Deserialize, Serialize};

use crate::error::{GateError, GateResult};

/// Namespace segment that marks a path as referencing a managed object.
pub const DEFAULT_GUARDED_NAMESPACE: &str = "attachments";

/// A request path after resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Sanitized key to read from the blob store.
    pub storage_key: StorageKey,
    /// Text after the final `.` of the raw path, or empty.
    pub extension: String,
    /// Set when the path references a managed object.
    pub guarded_object_id: Option<ObjectId>,
}

impl ResolvedPath {
    pub fn is_guarded(&self) -> bool {
        self.guarded_object_id.is_some()
    }
}

/// Parses incoming object paths. Performs no I/O.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathResolver {
    namespace: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GUARDED_NAMESPACE)
    }
}

impl PathResolver {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Resolve a raw path taken from the serving route.
    ///
    /// The path is sanitized once, up front; guarded-path detection and id
    /// extraction both run on the sanitized form so a traversal sequence can
    /// never move a managed object out of the guarded namespace.
    pub fn resolve(&self, raw: &str) -> GateResult<ResolvedPath> {
        let extension = extension_of(raw).to_string();
        let storage_key = StorageKey::sanitize(raw);
        let guarded_object_id = self.guarded_id(storage_key.as_str())?;
        Ok(ResolvedPath {
            storage_key,
            extension,
            guarded_object_id,
        })
    }

    fn guarded_id(&self, path: &str) -> GateResult<Option<ObjectId>> {
        let Some(rest) = path.strip_prefix(self.namespace.as_str()) else {
            return Ok(None);
        };
        if !rest.is_empty() && !rest.starts_with('/') {
            // A sibling such as "attachments-old/..." is not guarded.
            return Ok(None);
        }
        let slug = rest
            .strip_prefix('/')
            .ok_or_else(|| GateError::Resolution(format!("no object path after {}", self.namespace)))?;
        let (id, _) = slug
            .split_once('-')
            .ok_or_else(|| GateError::Resolution(format!("no id delimiter in {slug}")))?;
        ObjectId::parse(id)
            .map(Some)
            .map_err(|e| GateError::Resolution(e.to_string()))
    }
}

/// Text after the final `.`, or empty when there is none.
pub fn extension_of(raw: &str) -> &str {
    raw.rfind('.').map(|at| &raw[at + 1..]).unwrap_or("")
}
