use std::path::Path;

use blobguard_gate::{DocumentRecord, InMemoryDocumentDirectory};
use blobguard_store::InMemoryObjectCatalog;
use blobguard_types::StoredObject;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// On-disk snapshot of object metadata and document permissions.
///
/// ```json
/// {
///   "objects": [{ "id": "abc123", "utilized": true, "document_ids": ["D1"] }],
///   "documents": [{ "id": "D1", "viewers": ["alice"] }]
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub objects: Vec<StoredObject>,
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

impl CatalogFile {
    pub fn from_json_str(s: &str) -> ServerResult<Self> {
        serde_json::from_str(s).map_err(|e| ServerError::Catalog(e.to_string()))
    }

    pub fn from_json_file(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Split into the two in-memory collaborators the guard consults.
    pub fn into_collaborators(self) -> (InMemoryObjectCatalog, InMemoryDocumentDirectory) {
        for obj in &self.objects {
            if obj.utilized && obj.candidate_documents().is_empty() {
                tracing::warn!(object = %obj.id, "utilized object has no references and will be denied");
            }
        }
        (
            InMemoryObjectCatalog::from_objects(self.objects),
            InMemoryDocumentDirectory::from_documents(self.documents),
        )
    }
}
