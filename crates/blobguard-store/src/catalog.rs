use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use blobguard_types::{DocumentId, ObjectId, StoredObject};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Lookup of stored-object reference metadata.
#[async_trait]
pub trait ObjectMetadataStore: Send + Sync {
    /// Find an object by id.
    ///
    /// Returns `Ok(None)` if no record exists.
    /// Returns `Err` when the backend itself fails.
    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;
}

/// In-memory object catalog.
///
/// Besides lookups it implements the mutations the document editor performs
/// when documents attach, discard, or drop an object.
pub struct InMemoryObjectCatalog {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectCatalog {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the catalog from existing records.
    pub fn from_objects(objects: impl IntoIterator<Item = StoredObject>) -> Self {
        let catalog = Self::new();
        {
            let mut map = catalog.objects.write().expect("lock poisoned");
            for obj in objects {
                map.insert(obj.id.clone(), obj);
            }
        }
        catalog
    }

    /// Record a completed upload. Re-inserting an existing id is a no-op.
    pub fn insert_upload(&self, id: ObjectId) {
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id.clone())
            .or_insert_with(|| StoredObject::upload(id));
    }

    /// A live document now references the object.
    ///
    /// Marks the object utilized. A reference previously held only from a
    /// discarded state becomes live again.
    pub fn attach(&self, id: &ObjectId, document: DocumentId) -> StoreResult<()> {
        self.mutate(id, |obj| {
            obj.utilized = true;
            obj.discarded_document_ids.remove(&document);
            obj.document_ids.insert(document);
            Ok(())
        })
    }

    /// The referencing document moved to a discarded state.
    pub fn discard(&self, id: &ObjectId, document: &DocumentId) -> StoreResult<()> {
        self.mutate(id, |obj| {
            if !obj.document_ids.remove(document) {
                return Err(StoreError::NotReferenced {
                    object: obj.id.clone(),
                    document: document.clone(),
                });
            }
            obj.discarded_document_ids.insert(document.clone());
            Ok(())
        })
    }

    /// The document no longer references the object at all.
    ///
    /// `utilized` stays `true`; an object never returns to the upload state.
    pub fn detach(&self, id: &ObjectId, document: &DocumentId) -> StoreResult<()> {
        self.mutate(id, |obj| {
            let live = obj.document_ids.remove(document);
            let discarded = obj.discarded_document_ids.remove(document);
            if !live && !discarded {
                return Err(StoreError::NotReferenced {
                    object: obj.id.clone(),
                    document: document.clone(),
                });
            }
            Ok(())
        })
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    fn mutate(
        &self,
        id: &ObjectId,
        f: impl FnOnce(&mut StoredObject) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        let obj = map
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownObject(id.clone()))?;
        f(obj)?;
        debug!(object = %id, utilized = obj.utilized, "object references updated");
        Ok(())
    }
}

impl Default for InMemoryObjectCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectMetadataStore for InMemoryObjectCatalog {
    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }
}

impl std::fmt::Debug for InMemoryObjectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectCatalog")
            .field("object_count", &self.len())
            .finish()
    }
}
