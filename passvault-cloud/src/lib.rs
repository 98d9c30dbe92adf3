//! WebDAV sync engine for PassVault.
//!
//! Keeps a local vault consistent with a copy on a plain WebDAV share:
//! - Remote storage client over GET/PUT/DELETE/MOVE/MKCOL with Basic auth
//! - Backup index (`index.2faspass`) with one slot per vault and seed hash
//! - Advisory lock lease (`index.2faspass.lock`) with a 20 second TTL
//! - Atomic publish: write a `.tmp` file, then MOVE it over the backup
//! - Sync orchestration with a caller-supplied merge callback
//!
//! The store offers no transactions or native locking, so cross-device
//! exclusion rests entirely on the lock lease.

pub mod config;
pub mod error;
pub mod lock;
pub mod merge_handler;
pub mod sync_service;
pub mod types;
pub mod webdav_client;

pub use config::WebDavConfig;
pub use error::{CloudError, CloudResult, WebDavError, WebDavResult};
pub use merge_handler::BackupMergeHandler;
pub use sync_service::{CloudSyncService, MergeCallback};
pub use types::*;
pub use webdav_client::WebDavClient;
