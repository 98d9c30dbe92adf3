//! Local vault snapshot.

use crate::{DeletedItem, Login, Tag};
use serde::{Deserialize, Serialize};

/// The decrypted state of a vault as held by the local store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vault {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub logins: Vec<Login>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub deleted_items: Vec<DeletedItem>,
}

impl Vault {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            updated_at: created_at,
            logins: Vec::new(),
            tags: Vec::new(),
            deleted_items: Vec::new(),
        }
    }
}
