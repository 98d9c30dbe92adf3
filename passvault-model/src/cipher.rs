//! Seam to the vault encryption collaborator.
//!
//! Key derivation and the AEAD cipher are owned by the crypto layer. The
//! backup codec only needs opaque byte-in/byte-out operations.

use thiserror::Error;

/// Errors reported by a [`VaultCipher`] implementation.
#[derive(Debug, Error)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("vault key not available")]
    KeyUnavailable,
}

/// Opaque encryption capability for a single vault.
pub trait VaultCipher: Send + Sync {
    /// Encrypts plaintext with the vault key.
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Decrypts ciphertext produced by [`VaultCipher::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError>;

    /// Decrypts a backup's key reference with the externally supplied key.
    ///
    /// Used only to check that a candidate key opens a backup before any
    /// entity is decrypted. Success means the key matches.
    fn decrypt_with_external_key(&self, reference: &[u8]) -> Result<Vec<u8>, CipherError>;
}
