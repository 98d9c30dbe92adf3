//! Login entries.

use serde::{Deserialize, Serialize};

/// A stored credential. The mergeable unit of a vault.
///
/// `deleted` and `deleted_at` travel together: a soft-deleted login always
/// records when it was deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub id: String,
    pub vault_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub security_type: SecurityType,
    #[serde(default)]
    pub uris: Vec<LoginUri>,
    #[serde(default)]
    pub icon_type: IconType,
    #[serde(default)]
    pub icon_uri_index: Option<u32>,
    #[serde(default)]
    pub custom_image_url: Option<String>,
    #[serde(default)]
    pub label_text: Option<String>,
    #[serde(default)]
    pub label_color: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Ids of the tags attached to this login.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Login {
    /// Creates an empty, live login.
    pub fn new(id: impl Into<String>, vault_id: impl Into<String>, updated_at: i64) -> Self {
        Self {
            id: id.into(),
            vault_id: vault_id.into(),
            created_at: updated_at,
            updated_at,
            deleted: false,
            deleted_at: None,
            name: None,
            username: None,
            password: None,
            security_type: SecurityType::default(),
            uris: Vec::new(),
            icon_type: IconType::default(),
            icon_uri_index: None,
            custom_image_url: None,
            label_text: None,
            label_color: None,
            notes: None,
            tags: Vec::new(),
        }
    }

    /// Returns a soft-deleted copy stamped with `at`.
    pub fn marked_deleted(&self, at: i64) -> Self {
        Self {
            updated_at: at,
            deleted: true,
            deleted_at: Some(at),
            ..self.clone()
        }
    }

    /// True when the `deleted` flag and `deleted_at` agree.
    pub fn is_consistent(&self) -> bool {
        self.deleted == self.deleted_at.is_some()
    }
}

/// A URI the login applies to, with its matching rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUri {
    pub text: String,
    #[serde(default)]
    pub matcher: UriMatcher,
}

/// How a login URI is compared against a candidate URI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UriMatcher {
    #[default]
    Domain,
    Host,
    StartsWith,
    Exact,
}

/// Protection tier of a login's secret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityType {
    Top,
    #[default]
    Highly,
    Secret,
}

/// How the login's icon is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IconType {
    #[default]
    Icon,
    Label,
    CustomImageUrl,
}
