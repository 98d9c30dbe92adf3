//! Entity kinds the merge engine can reconcile.

use passvault_model::{Login, Tag};

/// An entity with a stable id and a mutation timestamp.
pub trait Mergeable: Clone {
    fn id(&self) -> &str;

    fn updated_at(&self) -> i64;

    /// Returns the copy of `self` that represents it deleted at `deleted_at`.
    fn with_tombstone_applied(&self, deleted_at: i64) -> Self;
}

impl Mergeable for Login {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn with_tombstone_applied(&self, deleted_at: i64) -> Self {
        self.marked_deleted(deleted_at)
    }
}

impl Mergeable for Tag {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    // Tags have no deleted flag; the tombstone itself carries the removal.
    fn with_tombstone_applied(&self, deleted_at: i64) -> Self {
        Self {
            updated_at: deleted_at,
            ..self.clone()
        }
    }
}
