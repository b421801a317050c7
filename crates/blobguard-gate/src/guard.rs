use std::sync::Arc;

use blobguard_store::ObjectMetadataStore;
use blobguard_types::{AccessDecision, ObjectId, Principal};
use tracing::debug;

use crate::error::GateResult;
use crate::visibility::{DocumentVisibility, VisibilityQuery};

/// Decides whether a principal may read a managed object.
///
/// Every call re-evaluates against the collaborators; no decision is cached.
#[derive(Clone)]
pub struct AccessGuard {
    objects: Arc<dyn ObjectMetadataStore>,
    documents: Arc<dyn DocumentVisibility>,
}

impl AccessGuard {
    pub fn new(
        objects: Arc<dyn ObjectMetadataStore>,
        documents: Arc<dyn DocumentVisibility>,
    ) -> Self {
        Self { objects, documents }
    }

    /// Authorize `principal` to read object `id`.
    ///
    /// - No metadata record: `NotFound`.
    /// - Not yet utilized: `Allow`. An upload's unguessable id is its only
    ///   access control until a document attaches it.
    /// - Utilized: permissions derive from the referencing documents, live or
    ///   discarded. An empty reference set fails closed with `Forbidden`.
    ///
    /// Collaborator failures propagate as `Err`.
    pub async fn authorize(
        &self,
        principal: &Principal,
        id: &ObjectId,
    ) -> GateResult<AccessDecision> {
        let Some(object) = self.objects.find_by_id(id).await? else {
            debug!(object = %id, "no metadata record");
            return Ok(AccessDecision::NotFound);
        };

        if !object.utilized {
            debug!(object = %id, %principal, "unutilized upload, allowing");
            return Ok(AccessDecision::Allow);
        }

        let candidates = object.candidate_documents();
        if candidates.is_empty() {
            debug!(object = %id, "utilized object without references, denying");
            return Ok(AccessDecision::Forbidden);
        }

        let visible = self
            .documents
            .is_visible_to_any(principal, &candidates, VisibilityQuery::for_attachments())
            .await?;
        let decision = if visible {
            AccessDecision::Allow
        } else {
            AccessDecision::Forbidden
        };
        debug!(object = %id, %principal, documents = candidates.len(), %decision, "evaluated document visibility");
        Ok(decision)
    }
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard").finish_non_exhaustive()
    }
}
