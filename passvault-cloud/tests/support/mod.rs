//! Shared helpers for WebDAV sync tests: an in-memory WebDAV server mounted
//! on wiremock, a toy cipher and vault fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use passvault_cloud::{
    LockRecord, MergeCallback, MergedBackup, SyncRequest, WebDavClient, WebDavConfig,
};
use passvault_model::{
    BackupEncryption, BackupOrigin, CipherError, DeletedItem, DeletedItemType, KdfSpec, Login,
    SCHEMA_VERSION, Tag, Vault, VaultCipher,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct-horse";
pub const COLLECTION: &str = "/dav/vaults";

// --- Fake WebDAV server ---

#[derive(Default)]
struct FakeState {
    files: BTreeMap<String, Vec<u8>>,
    collection_created: bool,
    log: Vec<(String, String)>,
    failures: Vec<(String, String, u16)>,
    replace_after_put: Option<(String, Vec<u8>)>,
}

/// Minimal WebDAV server: one flat collection, Basic auth, GET/PUT/DELETE/
/// MOVE/MKCOL. Every request is recorded as `(METHOD, file name)`.
#[derive(Clone, Default)]
pub struct FakeWebDav {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWebDav {
    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(name).cloned()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn insert(&self, name: &str, content: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(name.to_string(), content.into());
    }

    pub fn insert_lock(&self, device_id: &str, timestamp: i64) {
        let record = LockRecord::new(device_id, timestamp);
        self.insert(
            "index.2faspass.lock",
            serde_json::to_vec(&record).unwrap(),
        );
    }

    pub fn collection_created(&self) -> bool {
        self.state.lock().unwrap().collection_created
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn requests_for(&self, method: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, name)| name)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().log.clear();
    }

    /// Answers every `method` request for `name` with `status`.
    pub fn fail(&self, method: &str, name: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method.to_string(), name.to_string(), status));
    }

    /// After the next successful PUT of `name`, silently swaps its content,
    /// as if another client wrote right behind us.
    pub fn replace_after_put(&self, name: &str, content: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().replace_after_put = Some((name.to_string(), content.into()));
    }

    fn authorized(request: &Request) -> bool {
        let expected = format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{PASSWORD}")));
        request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn file_name(path: &str) -> String {
        path.strip_prefix(COLLECTION)
            .unwrap_or(path)
            .trim_start_matches('/')
            .to_string()
    }
}

impl Respond for FakeWebDav {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let method = request.method.as_str().to_string();
        let name = Self::file_name(request.url.path());
        let mut state = self.state.lock().unwrap();
        state.log.push((method.clone(), name.clone()));

        if !Self::authorized(request) {
            return ResponseTemplate::new(401);
        }
        if let Some((_, _, status)) = state
            .failures
            .iter()
            .find(|(m, n, _)| *m == method && *n == name)
        {
            return ResponseTemplate::new(*status);
        }

        match method.as_str() {
            "GET" => match state.files.get(&name) {
                Some(body) => ResponseTemplate::new(200).set_body_bytes(body.clone()),
                None => ResponseTemplate::new(404),
            },
            "PUT" => {
                let replaced = state.files.insert(name.clone(), request.body.clone());
                if let Some((target, content)) = state
                    .replace_after_put
                    .take_if(|(target, _)| *target == name)
                {
                    state.files.insert(target, content);
                }
                ResponseTemplate::new(if replaced.is_some() { 204 } else { 201 })
            }
            "DELETE" => match state.files.remove(&name) {
                Some(_) => ResponseTemplate::new(204),
                None => ResponseTemplate::new(404),
            },
            "MKCOL" => {
                if state.collection_created {
                    ResponseTemplate::new(405)
                } else {
                    state.collection_created = true;
                    ResponseTemplate::new(201)
                }
            }
            "MOVE" => {
                let destination = request
                    .headers
                    .get("destination")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| reqwest::Url::parse(v).ok())
                    .map(|url| Self::file_name(url.path()));
                let Some(destination) = destination else {
                    return ResponseTemplate::new(400);
                };
                let overwrite = request
                    .headers
                    .get("overwrite")
                    .and_then(|v| v.to_str().ok())
                    .is_none_or(|v| v == "T");
                if state.files.contains_key(&destination) && !overwrite {
                    return ResponseTemplate::new(412);
                }
                match state.files.remove(&name) {
                    Some(body) => {
                        let replaced = state.files.insert(destination, body);
                        ResponseTemplate::new(if replaced.is_some() { 204 } else { 201 })
                    }
                    None => ResponseTemplate::new(404),
                }
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Starts a mock server backed by a fresh [`FakeWebDav`].
pub async fn start() -> (MockServer, FakeWebDav) {
    let server = MockServer::start().await;
    let fake = FakeWebDav::default();
    Mock::given(any())
        .respond_with(fake.clone())
        .mount(&server)
        .await;
    (server, fake)
}

pub fn config(server: &MockServer) -> WebDavConfig {
    WebDavConfig {
        base_url: format!("{}{COLLECTION}", server.uri()),
        username: USERNAME.into(),
        password: PASSWORD.into(),
        allow_untrusted_certificate: false,
        allow_cleartext: true,
        request_timeout_secs: 5,
    }
}

pub fn client(server: &MockServer) -> WebDavClient {
    WebDavClient::new(config(server)).expect("client must build")
}

/// Routes sync logs to the test output. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("passvault_cloud=debug,passvault_merge=debug"))
        .with_test_writer()
        .try_init();
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

// --- Merge callbacks ---

/// Returns fixed content and records what it was handed.
pub struct RecordingMerge {
    pub content: Vec<u8>,
    pub vault_updated_at: i64,
    pub seen: Mutex<Vec<Option<Vec<u8>>>>,
}

impl RecordingMerge {
    pub fn new(content: &[u8], vault_updated_at: i64) -> Self {
        Self {
            content: content.to_vec(),
            vault_updated_at,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Option<Vec<u8>>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl MergeCallback for RecordingMerge {
    async fn merge(&self, remote: Option<Vec<u8>>) -> anyhow::Result<MergedBackup> {
        self.seen.lock().unwrap().push(remote);
        Ok(MergedBackup {
            content: self.content.clone(),
            vault_updated_at: self.vault_updated_at,
        })
    }
}

pub struct FailingMerge;

#[async_trait]
impl MergeCallback for FailingMerge {
    async fn merge(&self, _remote: Option<Vec<u8>>) -> anyhow::Result<MergedBackup> {
        anyhow::bail!("vault key rejected by user")
    }
}

pub fn sync_request(vault_id: &str, device_id: &str, vault_updated_at: i64) -> SyncRequest {
    SyncRequest {
        vault_id: vault_id.into(),
        seed_hash_hex: "a1b2c3".into(),
        device_id: device_id.into(),
        device_name: format!("{device_id} phone"),
        vault_created_at: 1_000,
        vault_updated_at,
        schema_version: SCHEMA_VERSION,
    }
}

// --- Vault fixtures ---

/// Toy cipher: first byte tags the key, the rest is XORed with it.
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

pub fn encryption_for(cipher: &XorCipher) -> BackupEncryption {
    let reference = cipher.encrypt(b"reference").expect("toy cipher never fails");
    BackupEncryption {
        seed_hash_hex: "a1b2c3".into(),
        reference: STANDARD.encode(reference),
        kdf_spec: KdfSpec::default(),
    }
}

pub fn origin(device_name: &str) -> BackupOrigin {
    BackupOrigin {
        os: "android".into(),
        app_version_code: 1_040_000,
        app_package_name: "com.passvault.app".into(),
        device_name: device_name.into(),
        device_fingerprint: format!("fp-{device_name}"),
    }
}

pub fn login(id: &str, name: &str, updated_at: i64) -> Login {
    let mut login = Login::new(id, "vault-1", updated_at);
    login.name = Some(name.into());
    login
}

/// Vault with one login and one tag, shared by both simulated devices.
pub fn shared_vault() -> Vault {
    let mut vault = Vault::new("vault-1", "Personal", 1_000);
    vault.updated_at = 2_000;
    vault.logins = vec![login("login-1", "GitHub", 1_500)];
    vault.tags = vec![Tag::new("tag-1", "vault-1", "Work", 1_200)];
    vault
}

pub fn tombstone(id: &str, kind: DeletedItemType, deleted_at: i64) -> DeletedItem {
    DeletedItem::new(id, "vault-1", kind, deleted_at)
}
