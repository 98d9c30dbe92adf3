//! Tombstones.

use serde::{Deserialize, Serialize};

/// Records that an entity id was deleted at a given time.
///
/// Tombstones let a device learn about a deletion it cannot otherwise observe
/// (the absence of a row looks the same as "never synced").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedItem {
    pub id: String,
    pub vault_id: String,
    #[serde(rename = "type")]
    pub kind: DeletedItemType,
    pub deleted_at: i64,
}

impl DeletedItem {
    pub fn new(
        id: impl Into<String>,
        vault_id: impl Into<String>,
        kind: DeletedItemType,
        deleted_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            vault_id: vault_id.into(),
            kind,
            deleted_at,
        }
    }
}

/// Kind of entity a tombstone refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletedItemType {
    Login,
    Tag,
}
