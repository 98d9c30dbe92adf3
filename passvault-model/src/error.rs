//! Backup model error types.

use crate::cipher::CipherError;
use thiserror::Error;

/// Result type for backup model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while decoding, encrypting or decrypting a vault backup.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported backup schema version {found} (supported: {supported})")]
    UnsupportedSchemaVersion { found: u32, supported: u32 },

    #[error("malformed backup: {0}")]
    Malformed(String),

    #[error("backup is encrypted but carries no encryption metadata")]
    MissingEncryption,

    #[error("vault key does not match the backup reference")]
    InvalidKey,

    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("base64 decoding failed: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
