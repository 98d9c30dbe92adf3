//! Tags.

use serde::{Deserialize, Serialize};

/// A user-defined label attached to logins.
///
/// Tags have no soft-delete state of their own; removal is carried by a
/// [`DeletedItem`](crate::DeletedItem) tombstone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub vault_id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: u32,
    pub updated_at: i64,
}

impl Tag {
    pub fn new(
        id: impl Into<String>,
        vault_id: impl Into<String>,
        name: impl Into<String>,
        updated_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            vault_id: vault_id.into(),
            name: name.into(),
            color: None,
            position: 0,
            updated_at,
        }
    }
}
