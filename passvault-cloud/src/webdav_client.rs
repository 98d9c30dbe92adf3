//! HTTP client for a WebDAV vault store.
//!
//! Thin wrapper over the handful of WebDAV verbs the sync protocol needs.
//! It knows the index, lock and backup file names but carries no merge
//! semantics. Every request uses HTTP Basic auth from the config.

use crate::config::WebDavConfig;
use crate::error::{WebDavError, WebDavResult};
use crate::lock::LockGuard;
use crate::types::{INDEX_FILE_NAME, LOCK_FILE_NAME, LockRecord, TEMP_FILE_SUFFIX, WebDavIndex};
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for one remote WebDAV store. Cheap to clone.
#[derive(Clone)]
pub struct WebDavClient {
    client: Client,
    config: Arc<WebDavConfig>,
}

impl WebDavClient {
    pub fn new(config: WebDavConfig) -> WebDavResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.allow_untrusted_certificate)
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &WebDavConfig {
        &self.config
    }

    // ── Requests ──

    fn request(&self, method: Method, url: &str) -> WebDavResult<RequestBuilder> {
        if self.config.is_cleartext() && !self.config.allow_cleartext {
            return Err(WebDavError::CleartextNotPermitted(self.config.base_url.clone()));
        }
        Ok(self
            .client
            .request(method, url)
            .basic_auth(&self.config.username, Some(&self.config.password)))
    }

    async fn send(&self, builder: RequestBuilder, method: &str, url: &str) -> WebDavResult<Response> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            debug!("{method} {url} -> {status}");
            return Err(WebDavError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    fn webdav_method(name: &str) -> WebDavResult<Method> {
        Method::from_bytes(name.as_bytes())
            .map_err(|e| WebDavError::InvalidRequest(format!("method {name}: {e}")))
    }

    // ── Files ──

    /// Downloads a file from the store.
    pub async fn get_file(&self, name: &str) -> WebDavResult<Vec<u8>> {
        let url = self.config.file_url(name);
        let builder = self.request(Method::GET, &url)?;
        let bytes = self.send(builder, "GET", &url).await?.bytes().await?;
        debug!("downloaded {} bytes from {url}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Uploads a file, replacing any existing content.
    pub async fn put_file(&self, name: &str, content: Vec<u8>) -> WebDavResult<()> {
        self.put(name, content, false).await
    }

    async fn put(&self, name: &str, content: Vec<u8>, overwrite_header: bool) -> WebDavResult<()> {
        let url = self.config.file_url(name);
        let size = content.len();
        let mut builder = self.request(Method::PUT, &url)?.body(content);
        if overwrite_header {
            builder = builder.header("Overwrite", "T");
        }
        self.send(builder, "PUT", &url).await?;
        debug!("uploaded {size} bytes to {url}");
        Ok(())
    }

    pub async fn delete_file(&self, name: &str) -> WebDavResult<()> {
        let url = self.config.file_url(name);
        let builder = self.request(Method::DELETE, &url)?;
        self.send(builder, "DELETE", &url).await?;
        debug!("deleted {url}");
        Ok(())
    }

    /// Renames `from` to `to`, replacing `to` if it exists.
    pub async fn move_file(&self, from: &str, to: &str) -> WebDavResult<()> {
        let url = self.config.file_url(from);
        let destination = self.config.file_url(to);
        let builder = self
            .request(Self::webdav_method("MOVE")?, &url)?
            .header("Destination", destination.as_str())
            .header("Overwrite", "T");
        self.send(builder, "MOVE", &url).await?;
        debug!("moved {url} -> {destination}");
        Ok(())
    }

    /// Creates the store's collection.
    pub async fn create_collection(&self) -> WebDavResult<()> {
        let url = self.config.collection_url();
        let builder = self.request(Self::webdav_method("MKCOL")?, &url)?;
        self.send(builder, "MKCOL", &url).await?;
        info!("created collection {url}");
        Ok(())
    }

    // ── Index ──

    /// Reads the backup index.
    ///
    /// A missing index is created (along with the collection) and returned
    /// empty. Any other failure, including an unparsable index, also yields
    /// an empty index so one bad file cannot block every future sync.
    pub async fn get_index(&self) -> WebDavResult<WebDavIndex> {
        match self.get_file(INDEX_FILE_NAME).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!("unreadable backup index, treating as empty: {e}");
                WebDavIndex::default()
            })),
            Err(e) if e.is_not_found() => {
                debug!("no backup index on remote, creating one");
                if let Err(e) = self.create_collection().await {
                    debug!("MKCOL failed (collection likely exists): {e}");
                }
                let index = WebDavIndex::default();
                self.put_index(&index).await?;
                Ok(index)
            }
            Err(WebDavError::CleartextNotPermitted(url)) => {
                Err(WebDavError::CleartextNotPermitted(url))
            }
            Err(e) => {
                warn!("failed to fetch backup index, treating as empty: {e}");
                Ok(WebDavIndex::default())
            }
        }
    }

    /// Reads the backup index without any fallback.
    ///
    /// A missing index is empty; transport errors, error statuses and an
    /// unparsable index are returned. Use this before overwriting the index.
    pub async fn read_index(&self) -> WebDavResult<WebDavIndex> {
        match self.get_file(INDEX_FILE_NAME).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.is_not_found() => Ok(WebDavIndex::default()),
            Err(e) => Err(e),
        }
    }

    /// Overwrites the backup index.
    pub async fn put_index(&self, index: &WebDavIndex) -> WebDavResult<()> {
        let bytes = serde_json::to_vec(index)?;
        self.put_file(INDEX_FILE_NAME, bytes).await
    }

    // ── Lock ──

    /// Tries to take the lock lease for `device_id`.
    ///
    /// The lease is taken when there is no lock, when `device_id` already
    /// owns it, or when it is stale (see [`LockRecord::is_stale`]).
    /// After writing, the record is read back and the lease only counts as
    /// held if it still names `device_id`.
    pub async fn obtain_lock(&self, device_id: &str) -> WebDavResult<bool> {
        let now = Utc::now().timestamp_millis();

        match self.get_file(LOCK_FILE_NAME).await {
            Ok(bytes) => match serde_json::from_slice::<LockRecord>(&bytes) {
                Ok(lock) if !lock.can_be_taken_by(device_id, now) => {
                    debug!(
                        "lock held by device {} since {}",
                        lock.device_id, lock.timestamp
                    );
                    return Ok(false);
                }
                Ok(lock) => debug!("taking over lock from device {}", lock.device_id),
                Err(e) => warn!("unreadable lock record, overwriting: {e}"),
            },
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let record = LockRecord::new(device_id, now);
        self.put(LOCK_FILE_NAME, serde_json::to_vec(&record)?, true)
            .await?;

        let confirmed = serde_json::from_slice::<LockRecord>(&self.get_file(LOCK_FILE_NAME).await?)
            .is_ok_and(|lock| lock.device_id == device_id);
        if !confirmed {
            debug!("lost lock race for device {device_id}");
        }
        Ok(confirmed)
    }

    /// Takes the lock lease and wraps it in a guard that releases on drop.
    pub async fn acquire_lock(&self, device_id: &str) -> WebDavResult<Option<LockGuard>> {
        if self.obtain_lock(device_id).await? {
            Ok(Some(LockGuard::new(self.clone())))
        } else {
            Ok(None)
        }
    }

    /// Deletes the lock record. Failures are logged, not returned: a lock that
    /// survives expires on its own.
    pub async fn release_lock(&self) {
        match self.delete_file(LOCK_FILE_NAME).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => debug!("lock already gone"),
            Err(e) => warn!("failed to release lock (expires after TTL): {e}"),
        }
    }

    // ── Wipe ──

    /// Deletes every backup listed in the index, then the index and the lock.
    pub async fn wipe_out(&self) -> WebDavResult<()> {
        let index = match self.get_file(INDEX_FILE_NAME).await {
            Ok(bytes) => serde_json::from_slice::<WebDavIndex>(&bytes).unwrap_or_default(),
            Err(e) if e.is_not_found() => WebDavIndex::default(),
            Err(e) => return Err(e),
        };

        for entry in &index.backups {
            let file_name = entry.file_name();
            self.delete_ignoring_missing(&file_name).await?;
            self.delete_ignoring_missing(&format!("{file_name}{TEMP_FILE_SUFFIX}"))
                .await?;
        }
        self.delete_ignoring_missing(INDEX_FILE_NAME).await?;
        self.delete_ignoring_missing(LOCK_FILE_NAME).await?;

        info!(
            "wiped {} backups from {}",
            index.len(),
            self.config.base_url
        );
        Ok(())
    }

    async fn delete_ignoring_missing(&self, name: &str) -> WebDavResult<()> {
        match self.delete_file(name).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }
}
