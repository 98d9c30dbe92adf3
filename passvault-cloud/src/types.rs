//! Shared types for WebDAV sync.

use passvault_model::cloud_file_name;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the backup index at the root of the store.
pub const INDEX_FILE_NAME: &str = "index.2faspass";

/// Name of the lock lease record.
pub const LOCK_FILE_NAME: &str = "index.2faspass.lock";

/// Suffix of the staging file written before the atomic MOVE.
pub const TEMP_FILE_SUFFIX: &str = ".tmp";

/// A lock older than this may be taken over by any device.
pub const LOCK_TTL: Duration = Duration::from_secs(20);

/// One backup known to the remote store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub device_id: String,
    pub device_name: String,
    pub seed_hash_hex: String,
    pub vault_id: String,
    pub vault_created_at: i64,
    pub vault_updated_at: i64,
    pub schema_version: u32,
}

impl IndexEntry {
    /// Remote file holding this backup.
    pub fn file_name(&self) -> String {
        cloud_file_name(&self.vault_id)
    }

    fn is_slot(&self, vault_id: &str, seed_hash_hex: &str) -> bool {
        self.vault_id == vault_id && self.seed_hash_hex == seed_hash_hex
    }
}

/// Directory of backups on the remote store. Serialized as a bare JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WebDavIndex {
    pub backups: Vec<IndexEntry>,
}

impl WebDavIndex {
    pub fn find(&self, vault_id: &str, seed_hash_hex: &str) -> Option<&IndexEntry> {
        self.backups.iter().find(|e| e.is_slot(vault_id, seed_hash_hex))
    }

    /// Replaces the entry in the same `(vault_id, seed_hash_hex)` slot, or
    /// appends it if the slot is free.
    pub fn upsert(&mut self, entry: IndexEntry) {
        match self
            .backups
            .iter_mut()
            .find(|e| e.is_slot(&entry.vault_id, &entry.seed_hash_hex))
        {
            Some(existing) => *existing = entry,
            None => self.backups.push(entry),
        }
    }

    pub fn remove(&mut self, vault_id: &str, seed_hash_hex: &str) -> Option<IndexEntry> {
        let pos = self
            .backups
            .iter()
            .position(|e| e.is_slot(vault_id, seed_hash_hex))?;
        Some(self.backups.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.backups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }
}

/// Lock lease record stored in [`LOCK_FILE_NAME`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    pub device_id: String,
    /// Acquisition time, epoch millis.
    pub timestamp: i64,
}

impl LockRecord {
    pub fn new(device_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            device_id: device_id.into(),
            timestamp,
        }
    }

    /// True once the lease has outlived [`LOCK_TTL`] at `now` (epoch millis).
    ///
    /// A record dated more than the TTL into the future is stale as well.
    pub fn is_stale(&self, now: i64) -> bool {
        let ttl = LOCK_TTL.as_millis() as i64;
        let age = now.saturating_sub(self.timestamp);
        age > ttl || age < -ttl
    }

    /// True if `device_id` may take this lock at `now`.
    pub fn can_be_taken_by(&self, device_id: &str, now: i64) -> bool {
        self.device_id == device_id || self.is_stale(now)
    }
}

/// What the caller knows about its local vault when it asks for a sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub vault_id: String,
    pub seed_hash_hex: String,
    pub device_id: String,
    pub device_name: String,
    pub vault_created_at: i64,
    /// Local vault's last-modified time, epoch millis.
    pub vault_updated_at: i64,
    pub schema_version: u32,
}

impl SyncRequest {
    /// Remote file for this vault's backup.
    pub fn file_name(&self) -> String {
        cloud_file_name(&self.vault_id)
    }

    /// True if `entry` was published by this device from this exact local state.
    pub fn is_current(&self, entry: &IndexEntry) -> bool {
        entry.vault_updated_at == self.vault_updated_at && entry.device_id == self.device_id
    }

    /// Index descriptor for a backup published from this request.
    pub fn index_entry(&self, vault_updated_at: i64) -> IndexEntry {
        IndexEntry {
            device_id: self.device_id.clone(),
            device_name: self.device_name.clone(),
            seed_hash_hex: self.seed_hash_hex.clone(),
            vault_id: self.vault_id.clone(),
            vault_created_at: self.vault_created_at,
            vault_updated_at,
            schema_version: self.schema_version,
        }
    }
}

/// Serialized backup produced by a merge callback, ready to publish.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedBackup {
    pub content: Vec<u8>,
    /// Vault timestamp recorded in the index for this content.
    pub vault_updated_at: i64,
}

/// Result of a successful sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote backup already reflects the local vault; nothing was written.
    UpToDate,
    /// A new backup was published.
    Published {
        file_name: String,
        vault_updated_at: i64,
    },
}
