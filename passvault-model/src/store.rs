//! Seam to the local persistent store.
//!
//! The sync layer reads the local vault snapshot and writes merge results back
//! through [`VaultStore`]. [`MemoryVaultStore`] keeps everything in memory and
//! is used by tests and by embedders that persist elsewhere.

use crate::{DeletedItem, Login, Tag, Vault};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Result type for local store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`VaultStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// CRUD repository over the entities of one local vault.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Returns the current decrypted vault snapshot.
    async fn get_vault(&self) -> StoreResult<Vault>;

    /// Inserts or replaces logins by id. Soft-deleted logins are stored as such.
    async fn import_items(&self, items: Vec<Login>) -> StoreResult<()>;

    /// Inserts or replaces tags by id.
    async fn import_tags(&self, tags: Vec<Tag>) -> StoreResult<()>;

    /// Removes tags by id. Unknown ids are ignored.
    async fn delete_tags(&self, ids: Vec<String>) -> StoreResult<()>;

    /// Replaces the vault's tombstone set.
    async fn set_deleted_items(&self, items: Vec<DeletedItem>) -> StoreResult<()>;

    /// Sets the vault's last-modified timestamp.
    async fn set_updated_timestamp(&self, vault_id: &str, updated_at: i64) -> StoreResult<()>;
}

/// In-memory [`VaultStore`].
#[derive(Clone)]
pub struct MemoryVaultStore {
    vault: Arc<RwLock<Vault>>,
}

impl MemoryVaultStore {
    pub fn new(vault: Vault) -> Self {
        Self {
            vault: Arc::new(RwLock::new(vault)),
        }
    }

    /// Returns a copy of the stored vault.
    pub async fn snapshot(&self) -> Vault {
        self.vault.read().await.clone()
    }
}

#[async_trait]
impl VaultStore for MemoryVaultStore {
    async fn get_vault(&self) -> StoreResult<Vault> {
        Ok(self.snapshot().await)
    }

    async fn import_items(&self, items: Vec<Login>) -> StoreResult<()> {
        let mut vault = self.vault.write().await;
        for item in items {
            match vault.logins.iter_mut().find(|l| l.id == item.id) {
                Some(existing) => *existing = item,
                None => vault.logins.push(item),
            }
        }
        Ok(())
    }

    async fn import_tags(&self, tags: Vec<Tag>) -> StoreResult<()> {
        let mut vault = self.vault.write().await;
        for tag in tags {
            match vault.tags.iter_mut().find(|t| t.id == tag.id) {
                Some(existing) => *existing = tag,
                None => vault.tags.push(tag),
            }
        }
        Ok(())
    }

    async fn delete_tags(&self, ids: Vec<String>) -> StoreResult<()> {
        let mut vault = self.vault.write().await;
        vault.tags.retain(|t| !ids.contains(&t.id));
        Ok(())
    }

    async fn set_deleted_items(&self, items: Vec<DeletedItem>) -> StoreResult<()> {
        self.vault.write().await.deleted_items = items;
        Ok(())
    }

    async fn set_updated_timestamp(&self, vault_id: &str, updated_at: i64) -> StoreResult<()> {
        let mut vault = self.vault.write().await;
        if vault.id != vault_id {
            return Err(StoreError::NotFound(format!("vault {vault_id}")));
        }
        vault.updated_at = updated_at;
        Ok(())
    }
}
