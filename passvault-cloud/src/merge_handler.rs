//! Standard merge callback: local store + vault cipher + merge engine.

use crate::sync_service::MergeCallback;
use crate::types::MergedBackup;
use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::Utc;
use passvault_merge::{CloudMerge, CloudMerger};
use passvault_model::{
    BackupEncryption, BackupOrigin, Login, Tag, VaultBackup, VaultCipher, VaultStore,
};
use std::sync::Arc;
use tracing::{debug, info};

struct Sealing {
    cipher: Arc<dyn VaultCipher>,
    encryption: BackupEncryption,
}

/// Merges a remote backup into the local store and serializes the result.
///
/// Without [`with_encryption`](Self::with_encryption) backups are published
/// in plain form and encrypted remote backups are rejected.
pub struct BackupMergeHandler {
    store: Arc<dyn VaultStore>,
    origin: BackupOrigin,
    sealing: Option<Sealing>,
}

impl BackupMergeHandler {
    pub fn new(store: Arc<dyn VaultStore>, origin: BackupOrigin) -> Self {
        Self {
            store,
            origin,
            sealing: None,
        }
    }

    /// Encrypts published backups and decrypts remote ones with `cipher`.
    pub fn with_encryption(
        mut self,
        cipher: Arc<dyn VaultCipher>,
        encryption: BackupEncryption,
    ) -> Self {
        self.sealing = Some(Sealing { cipher, encryption });
        self
    }

    fn open(&self, bytes: &[u8]) -> anyhow::Result<VaultBackup> {
        let backup = VaultBackup::decode(bytes).context("failed to decode remote backup")?;
        if !backup.is_encrypted() {
            return Ok(backup);
        }
        let Some(sealing) = &self.sealing else {
            bail!("remote backup is encrypted but no vault key is configured");
        };
        backup
            .decrypt(sealing.cipher.as_ref())
            .context("failed to decrypt remote backup")
    }

    fn seal(&self, backup: VaultBackup) -> anyhow::Result<Vec<u8>> {
        let backup = match &self.sealing {
            Some(sealing) => backup
                .encrypt(sealing.cipher.as_ref(), sealing.encryption.clone())
                .context("failed to encrypt backup")?,
            None => backup,
        };
        Ok(backup.encode()?)
    }

    async fn apply(&self, merge: CloudMerge) -> anyhow::Result<()> {
        let CloudMerge {
            logins,
            tags,
            deleted_items,
        } = merge;

        let login_changes: Vec<Login> = logins
            .to_add
            .into_iter()
            .chain(logins.to_update)
            .chain(logins.to_delete)
            .collect();
        if !login_changes.is_empty() {
            self.store.import_items(login_changes).await?;
        }

        let tag_changes: Vec<Tag> = tags.to_add.into_iter().chain(tags.to_update).collect();
        if !tag_changes.is_empty() {
            self.store.import_tags(tag_changes).await?;
        }

        let removed_tags: Vec<String> = tags.to_delete.into_iter().map(|t| t.id).collect();
        if !removed_tags.is_empty() {
            self.store.delete_tags(removed_tags).await?;
        }

        self.store.set_deleted_items(deleted_items).await?;
        Ok(())
    }
}

#[async_trait]
impl MergeCallback for BackupMergeHandler {
    async fn merge(&self, remote: Option<Vec<u8>>) -> anyhow::Result<MergedBackup> {
        let local_vault = self.store.get_vault().await?;

        if let Some(bytes) = remote {
            let remote = self.open(&bytes)?;
            if remote.vault_id != local_vault.id {
                bail!(
                    "remote backup belongs to vault {}, expected {}",
                    remote.vault_id,
                    local_vault.id
                );
            }

            let local = VaultBackup::from_vault(&local_vault, self.origin.clone());
            let merge = CloudMerger::merge(&local, &remote);
            info!(
                "applying merge for vault {}: {} login and {} tag changes",
                local_vault.id,
                merge.logins.len(),
                merge.tags.len()
            );
            self.apply(merge).await?;
        } else {
            debug!("no remote backup for vault {}", local_vault.id);
        }

        let vault_updated_at = Utc::now().timestamp_millis();
        self.store
            .set_updated_timestamp(&local_vault.id, vault_updated_at)
            .await?;

        let merged_vault = self.store.get_vault().await?;
        let content = self.seal(VaultBackup::from_vault(&merged_vault, self.origin.clone()))?;

        Ok(MergedBackup {
            content,
            vault_updated_at,
        })
    }
}
