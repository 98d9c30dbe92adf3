//! Cloud sync orchestration.
//!
//! One `sync` call is a straight sequence of network steps:
//! - read the index and find this vault's slot
//! - short-circuit if the slot already reflects the local state
//! - otherwise hand the remote content (if any) to the merge callback
//! - publish the result under the lock lease: PUT `.tmp`, MOVE over the
//!   backup, upsert the index entry, release
//!
//! The service never retries. `FileIsLocked` means another device is
//! publishing and the whole sync should be attempted again later.

use crate::error::{CloudError, CloudResult};
use crate::types::*;
use crate::webdav_client::WebDavClient;
use async_trait::async_trait;
use passvault_model::cloud_file_name;
use tracing::{debug, info, warn};

/// Reconciles local state with the remote backup and returns what to publish.
///
/// `remote` is `None` when the store has no backup for this vault yet.
/// Implementations decrypt, merge, apply changes locally and serialize the
/// merged vault. Their errors reach the `sync` caller unchanged.
#[async_trait]
pub trait MergeCallback: Send + Sync {
    async fn merge(&self, remote: Option<Vec<u8>>) -> anyhow::Result<MergedBackup>;
}

/// Drives sync of local vaults against one WebDAV store.
pub struct CloudSyncService {
    client: WebDavClient,
}

impl CloudSyncService {
    pub fn new(client: WebDavClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &WebDavClient {
        &self.client
    }

    /// Synchronizes one vault.
    ///
    /// At most one sync per vault may be in flight on a device; callers
    /// serialize. Cross-device exclusion is the remote lock lease.
    pub async fn sync(
        &self,
        request: &SyncRequest,
        merge: &dyn MergeCallback,
    ) -> CloudResult<SyncOutcome> {
        let index = self.client.get_index().await?;

        let merged = match index.find(&request.vault_id, &request.seed_hash_hex) {
            None => {
                info!(
                    "no remote backup for vault {}, publishing local state",
                    request.vault_id
                );
                merge.merge(None).await?
            }
            Some(entry) if request.is_current(entry) => {
                debug!("vault {} already in sync", request.vault_id);
                return Ok(SyncOutcome::UpToDate);
            }
            Some(entry) => {
                debug!(
                    "remote backup of vault {} from device {} at {}",
                    entry.vault_id, entry.device_id, entry.vault_updated_at
                );
                let remote = match self.client.get_file(&entry.file_name()).await {
                    Ok(bytes) => Some(bytes),
                    Err(e) if e.is_not_found() => {
                        warn!("index lists {} but the file is missing", entry.file_name());
                        None
                    }
                    Err(e) => return Err(e.into()),
                };
                merge.merge(remote).await?
            }
        };

        self.publish(request, merged).await
    }

    /// Atomically replaces this vault's backup and its index entry.
    async fn publish(&self, request: &SyncRequest, merged: MergedBackup) -> CloudResult<SyncOutcome> {
        let guard = self
            .client
            .acquire_lock(&request.device_id)
            .await?
            .ok_or(CloudError::FileIsLocked)?;

        let file_name = request.file_name();
        let temp_name = format!("{file_name}{TEMP_FILE_SUFFIX}");
        let size = merged.content.len();

        self.client.put_file(&temp_name, merged.content).await?;
        self.client.move_file(&temp_name, &file_name).await?;

        // Re-read under the lock so entries published by other devices since
        // the first read are kept. Strict: an unreadable index must not be
        // replaced by one holding only this entry.
        let mut index = self.client.read_index().await?;
        index.upsert(request.index_entry(merged.vault_updated_at));
        self.client.put_index(&index).await?;

        guard.release().await;

        info!(
            "published {file_name} ({size} bytes) for vault {} at {}",
            request.vault_id, merged.vault_updated_at
        );
        Ok(SyncOutcome::Published {
            file_name,
            vault_updated_at: merged.vault_updated_at,
        })
    }

    /// Backups currently listed in the store's index.
    pub async fn list_backups(&self) -> CloudResult<Vec<IndexEntry>> {
        Ok(self.client.get_index().await?.backups)
    }

    /// Raw content of a listed backup, for restore. `None` if it is not listed
    /// or the file is gone.
    pub async fn download_backup(
        &self,
        vault_id: &str,
        seed_hash_hex: &str,
    ) -> CloudResult<Option<Vec<u8>>> {
        let index = self.client.get_index().await?;
        if index.find(vault_id, seed_hash_hex).is_none() {
            return Ok(None);
        }

        match self.client.get_file(&cloud_file_name(vault_id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes every backup, the index and the lock from the store.
    pub async fn wipe(&self, device_id: &str) -> CloudResult<()> {
        let guard = self
            .client
            .acquire_lock(device_id)
            .await?
            .ok_or(CloudError::FileIsLocked)?;

        self.client.wipe_out().await?;
        guard.release().await;

        info!("wiped remote store {}", self.client.config().base_url);
        Ok(())
    }
}
