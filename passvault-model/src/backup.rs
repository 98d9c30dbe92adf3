//! The vault backup document and its codec.
//!
//! A backup is a JSON snapshot of one vault. When at-rest encryption is on,
//! every entity list is replaced by its `*Encrypted` counterpart: one base64
//! ciphertext per entity, produced by the vault's [`VaultCipher`].

use crate::cipher::VaultCipher;
use crate::error::{ModelError, ModelResult};
use crate::{DeletedItem, Login, Tag, Vault};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Backup schema version understood by this build.
pub const SCHEMA_VERSION: u32 = 1;

/// File name of a vault's backup on a remote store.
pub fn cloud_file_name(vault_id: &str) -> String {
    format!("{vault_id}_v{SCHEMA_VERSION}.2faspass")
}

/// File name of an unencrypted, user-initiated export.
pub fn export_file_name(vault_id: &str, at: DateTime<Utc>) -> String {
    format!(
        "2FAS_Pass_Vault_{vault_id}_{}.2faspass",
        at.format("%Y%m%d%H%M%S")
    )
}

/// Device and app that produced a backup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupOrigin {
    pub os: String,
    pub app_version_code: u32,
    pub app_package_name: String,
    pub device_name: String,
    pub device_fingerprint: String,
}

/// Key derivation parameters recorded alongside an encrypted backup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub hash_length: u32,
    pub memory_mb: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfSpec {
    fn default() -> Self {
        Self {
            kind: "argon2id".to_string(),
            hash_length: 32,
            memory_mb: 64,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Encryption metadata of a backup.
///
/// `reference` is a small ciphertext (base64) that only the right key opens;
/// it lets a device reject a wrong key without touching the entity lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEncryption {
    pub seed_hash_hex: String,
    pub reference: String,
    pub kdf_spec: KdfSpec,
}

/// Serialized snapshot of a vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultBackup {
    pub schema_version: u32,
    pub origin: BackupOrigin,
    pub vault_id: String,
    pub vault_name: String,
    pub vault_created_at: i64,
    pub vault_updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logins: Option<Vec<Login>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logins_encrypted: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_encrypted: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_items: Option<Vec<DeletedItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_items_encrypted: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption: Option<BackupEncryption>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaProbe {
    schema_version: u32,
}

impl VaultBackup {
    /// Builds an unencrypted backup from a local vault snapshot.
    pub fn from_vault(vault: &Vault, origin: BackupOrigin) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            origin,
            vault_id: vault.id.clone(),
            vault_name: vault.name.clone(),
            vault_created_at: vault.created_at,
            vault_updated_at: vault.updated_at,
            logins: Some(vault.logins.clone()),
            logins_encrypted: None,
            tags: Some(vault.tags.clone()),
            tags_encrypted: None,
            deleted_items: Some(vault.deleted_items.clone()),
            deleted_items_encrypted: None,
            encryption: None,
        }
    }

    /// Parses a backup document.
    ///
    /// The schema version is checked before the rest of the document so a
    /// newer format is reported as such rather than as a shape mismatch.
    pub fn decode(bytes: &[u8]) -> ModelResult<Self> {
        let probe: SchemaProbe = serde_json::from_slice(bytes)?;
        if probe.schema_version != SCHEMA_VERSION {
            return Err(ModelError::UnsupportedSchemaVersion {
                found: probe.schema_version,
                supported: SCHEMA_VERSION,
            });
        }

        let backup: Self = serde_json::from_slice(bytes)?;
        backup.validate()?;
        Ok(backup)
    }

    pub fn encode(&self) -> ModelResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// True if any entity list is carried in encrypted form.
    pub fn is_encrypted(&self) -> bool {
        self.logins_encrypted.is_some()
            || self.tags_encrypted.is_some()
            || self.deleted_items_encrypted.is_some()
    }

    /// Plain logins; empty when the backup is encrypted.
    pub fn logins(&self) -> &[Login] {
        self.logins.as_deref().unwrap_or(&[])
    }

    /// Plain tags; empty when the backup is encrypted.
    pub fn tags(&self) -> &[Tag] {
        self.tags.as_deref().unwrap_or(&[])
    }

    /// Plain tombstones; empty when the backup is encrypted.
    pub fn deleted_items(&self) -> &[DeletedItem] {
        self.deleted_items.as_deref().unwrap_or(&[])
    }

    /// Seed hash of the key that encrypted this backup, if any.
    pub fn seed_hash_hex(&self) -> Option<&str> {
        self.encryption.as_ref().map(|e| e.seed_hash_hex.as_str())
    }

    /// Returns an encrypted copy of this backup.
    pub fn encrypt(
        &self,
        cipher: &dyn VaultCipher,
        encryption: BackupEncryption,
    ) -> ModelResult<Self> {
        if self.is_encrypted() {
            return Err(ModelError::Malformed("backup is already encrypted".to_string()));
        }

        Ok(Self {
            logins: None,
            logins_encrypted: Some(seal_all(cipher, self.logins())?),
            tags: None,
            tags_encrypted: Some(seal_all(cipher, self.tags())?),
            deleted_items: None,
            deleted_items_encrypted: Some(seal_all(cipher, self.deleted_items())?),
            encryption: Some(encryption),
            ..self.clone()
        })
    }

    /// Returns a decrypted copy of this backup. Plain backups are returned as-is.
    ///
    /// The key is verified against the backup's reference first; a wrong key
    /// fails with [`ModelError::InvalidKey`].
    pub fn decrypt(&self, cipher: &dyn VaultCipher) -> ModelResult<Self> {
        if !self.is_encrypted() {
            return Ok(self.clone());
        }
        self.verify_key(cipher)?;

        let logins: Vec<Login> = open_all(cipher, self.logins_encrypted.as_deref())?;
        let tags: Vec<Tag> = open_all(cipher, self.tags_encrypted.as_deref())?;
        let deleted_items: Vec<DeletedItem> =
            open_all(cipher, self.deleted_items_encrypted.as_deref())?;

        debug!(
            "decrypted backup for vault {}: {} logins, {} tags, {} tombstones",
            self.vault_id,
            logins.len(),
            tags.len(),
            deleted_items.len()
        );

        Ok(Self {
            logins: Some(logins),
            logins_encrypted: None,
            tags: Some(tags),
            tags_encrypted: None,
            deleted_items: Some(deleted_items),
            deleted_items_encrypted: None,
            ..self.clone()
        })
    }

    /// Checks that `cipher` holds the key this backup was encrypted with.
    pub fn verify_key(&self, cipher: &dyn VaultCipher) -> ModelResult<()> {
        let encryption = self.encryption.as_ref().ok_or(ModelError::MissingEncryption)?;
        let reference = STANDARD.decode(&encryption.reference)?;
        cipher
            .decrypt_with_external_key(&reference)
            .map(|_| ())
            .map_err(|_| ModelError::InvalidKey)
    }

    fn validate(&self) -> ModelResult<()> {
        let pairs = [
            ("logins", self.logins.is_some(), self.logins_encrypted.is_some()),
            ("tags", self.tags.is_some(), self.tags_encrypted.is_some()),
            (
                "deletedItems",
                self.deleted_items.is_some(),
                self.deleted_items_encrypted.is_some(),
            ),
        ];
        for (field, plain, sealed) in pairs {
            if plain && sealed {
                return Err(ModelError::Malformed(format!(
                    "both {field} and {field}Encrypted are present"
                )));
            }
        }

        if self.is_encrypted() && self.encryption.is_none() {
            return Err(ModelError::MissingEncryption);
        }

        if let Some(login) = self.logins().iter().find(|l| !l.is_consistent()) {
            return Err(ModelError::Malformed(format!(
                "login {} has inconsistent deletion state",
                login.id
            )));
        }
        Ok(())
    }
}

fn seal_all<T: Serialize>(cipher: &dyn VaultCipher, items: &[T]) -> ModelResult<Vec<String>> {
    items
        .iter()
        .map(|item| {
            let plaintext = serde_json::to_vec(item)?;
            let ciphertext = cipher.encrypt(&plaintext)?;
            Ok(STANDARD.encode(ciphertext))
        })
        .collect()
}

fn open_all<T: DeserializeOwned>(
    cipher: &dyn VaultCipher,
    sealed: Option<&[String]>,
) -> ModelResult<Vec<T>> {
    sealed
        .unwrap_or(&[])
        .iter()
        .map(|encoded| {
            let ciphertext = STANDARD.decode(encoded)?;
            let plaintext = cipher.decrypt(&ciphertext)?;
            Ok(serde_json::from_slice(&plaintext)?)
        })
        .collect()
}
