use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ids::{DocumentId, ObjectId};

/// Reference metadata for a stored object.
///
/// Owned by the document store; blobguard only ever reads it. `utilized`
/// flips from `false` to `true` the first time a document attaches the
/// object and never flips back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub id: ObjectId,
    #[serde(default)]
    pub utilized: bool,
    /// Documents referencing the object in their live state.
    #[serde(default)]
    pub document_ids: BTreeSet<DocumentId>,
    /// Documents referencing the object only from a discarded state.
    #[serde(default)]
    pub discarded_document_ids: BTreeSet<DocumentId>,
}

impl StoredObject {
    /// A freshly uploaded object that no document references yet.
    pub fn upload(id: ObjectId) -> Self {
        Self {
            id,
            utilized: false,
            document_ids: BTreeSet::new(),
            discarded_document_ids: BTreeSet::new(),
        }
    }

    /// Union of live and discarded referencing documents.
    pub fn candidate_documents(&self) -> Vec<DocumentId> {
        self.document_ids
            .union(&self.discarded_document_ids)
            .cloned()
            .collect()
    }
}
