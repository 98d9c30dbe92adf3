//! Shared helpers for backup model tests.

use base64::{Engine, engine::general_purpose::STANDARD};
use passvault_model::{
    BackupEncryption, BackupOrigin, CipherError, DeletedItem, DeletedItemType, KdfSpec, Login,
    Tag, Vault, VaultCipher,
};

/// Toy cipher: first byte tags the key, the rest is XORed with it.
/// A different key fails to decrypt, which is all the codec needs.
pub struct XorCipher {
    pub key: u8,
}

impl VaultCipher for XorCipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut out = Vec::with_capacity(plaintext.len() + 1);
        out.push(self.key);
        out.extend(plaintext.iter().map(|b| b ^ self.key));
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        match ciphertext.split_first() {
            Some((tag, body)) if *tag == self.key => Ok(body.iter().map(|b| b ^ self.key).collect()),
            _ => Err(CipherError::Decryption("wrong key".into())),
        }
    }

    fn decrypt_with_external_key(&self, reference: &[u8]) -> Result<Vec<u8>, CipherError> {
        self.decrypt(reference)
    }
}

pub fn origin() -> BackupOrigin {
    BackupOrigin {
        os: "android".into(),
        app_version_code: 1_040_000,
        app_package_name: "com.passvault.app".into(),
        device_name: "Pixel 9".into(),
        device_fingerprint: "fp-1".into(),
    }
}

pub fn encryption_for(cipher: &XorCipher) -> BackupEncryption {
    let reference = cipher.encrypt(b"reference").expect("toy cipher never fails");
    BackupEncryption {
        seed_hash_hex: "a1b2c3".into(),
        reference: STANDARD.encode(reference),
        kdf_spec: KdfSpec::default(),
    }
}

pub fn sample_vault() -> Vault {
    let mut vault = Vault::new("vault-1", "Personal", 1_000);
    vault.updated_at = 5_000;

    let mut github = Login::new("login-1", "vault-1", 2_000);
    github.name = Some("GitHub".into());
    github.username = Some("octocat".into());
    github.password = Some("hunter2".into());
    github.tags = vec!["tag-1".into()];

    let trashed = Login::new("login-2", "vault-1", 2_500).marked_deleted(3_000);

    vault.logins = vec![github, trashed];
    vault.tags = vec![Tag::new("tag-1", "vault-1", "Work", 1_500)];
    vault.deleted_items = vec![DeletedItem::new("login-9", "vault-1", DeletedItemType::Login, 4_000)];
    vault
}
