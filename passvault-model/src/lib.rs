//! Vault backup data model for PassVault.
//!
//! Defines the serializable snapshot of a vault that every other layer
//! produces or consumes:
//! - Logins and Tags (the mergeable entities)
//! - Tombstones (`DeletedItem`) that carry deletions across devices
//! - `VaultBackup`, the on-the-wire document with optional at-rest encryption
//!
//! Encryption primitives and local persistence live outside this crate and
//! are consumed through the [`VaultCipher`] and [`VaultStore`] seams.

mod backup;
mod cipher;
mod deleted_item;
mod error;
mod login;
mod store;
mod tag;
mod vault;

pub use backup::{
    BackupEncryption, BackupOrigin, KdfSpec, SCHEMA_VERSION, VaultBackup, cloud_file_name,
    export_file_name,
};
pub use cipher::{CipherError, VaultCipher};
pub use deleted_item::{DeletedItem, DeletedItemType};
pub use error::{ModelError, ModelResult};
pub use login::{IconType, Login, LoginUri, SecurityType, UriMatcher};
pub use store::{MemoryVaultStore, StoreError, StoreResult, VaultStore};
pub use tag::Tag;
pub use vault::Vault;
