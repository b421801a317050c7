use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use blobguard_types::{DocumentId, Principal};
use serde::{Deserialize, Serialize};

use crate::error::GateResult;

/// Options for a document visibility query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityQuery {
    /// Admit documents in a discarded (archived or trashed) state.
    pub include_discarded: bool,
    /// Lift the document store's default list filters, such as the
    /// published-only filter.
    pub ignore_default_filters: bool,
}

impl VisibilityQuery {
    /// The query used to authorize object reads: could the principal see
    /// the object through any document, live or not.
    pub fn for_attachments() -> Self {
        Self {
            include_discarded: true,
            ignore_default_filters: true,
        }
    }
}

/// The document store's answer to "can this principal see any of these".
#[async_trait]
pub trait DocumentVisibility: Send + Sync {
    async fn is_visible_to_any(
        &self,
        principal: &Principal,
        documents: &[DocumentId],
        query: VisibilityQuery,
    ) -> GateResult<bool>;
}

/// A document as known to [`InMemoryDocumentDirectory`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    #[serde(default = "default_true")]
    pub published: bool,
    #[serde(default)]
    pub discarded: bool,
    /// Readable by anyone, including anonymous principals.
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub viewers: BTreeSet<String>,
    #[serde(default)]
    pub editors: BTreeSet<String>,
}

fn default_true() -> bool {
    true
}

impl DocumentRecord {
    /// A published, live, non-public document.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(id),
            published: true,
            discarded: false,
            public: false,
            viewers: BTreeSet::new(),
            editors: BTreeSet::new(),
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    pub fn discarded(mut self) -> Self {
        self.discarded = true;
        self
    }

    pub fn with_viewer(mut self, name: impl Into<String>) -> Self {
        self.viewers.insert(name.into());
        self
    }

    pub fn with_editor(mut self, name: impl Into<String>) -> Self {
        self.editors.insert(name.into());
        self
    }

    fn is_editor(&self, principal: &Principal) -> bool {
        principal.name().is_some_and(|n| self.editors.contains(n))
    }

    /// Whether `principal` can see this document under `query`.
    ///
    /// Discarded documents and unpublished drafts are only ever visible to
    /// editors, and only when the query lifts the matching filter.
    pub fn visible_to(&self, principal: &Principal, query: VisibilityQuery) -> bool {
        if self.discarded {
            return query.include_discarded && self.is_editor(principal);
        }
        if !self.published {
            return query.ignore_default_filters && self.is_editor(principal);
        }
        self.public
            || self.is_editor(principal)
            || principal.name().is_some_and(|n| self.viewers.contains(n))
    }
}

/// In-memory document permissions, keyed by document id.
pub struct InMemoryDocumentDirectory {
    documents: RwLock<HashMap<DocumentId, DocumentRecord>>,
}

impl InMemoryDocumentDirectory {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_documents(documents: impl IntoIterator<Item = DocumentRecord>) -> Self {
        let directory = Self::new();
        for doc in documents {
            directory.upsert(doc);
        }
        directory
    }

    /// Insert or replace a document.
    pub fn upsert(&self, document: DocumentRecord) {
        let mut map = self.documents.write().expect("lock poisoned");
        map.insert(document.id.clone(), document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryDocumentDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentVisibility for InMemoryDocumentDirectory {
    async fn is_visible_to_any(
        &self,
        principal: &Principal,
        documents: &[DocumentId],
        query: VisibilityQuery,
    ) -> GateResult<bool> {
        let map = self.documents.read().expect("lock poisoned");
        Ok(documents
            .iter()
            .filter_map(|id| map.get(id))
            .any(|doc| doc.visible_to(principal, query)))
    }
}
