//! Scoped ownership of the remote lock lease.

use crate::types::LOCK_TTL;
use crate::webdav_client::WebDavClient;
use tracing::{debug, warn};

/// Holds the remote lock lease until released.
///
/// Call [`LockGuard::release`] on the success path. If the guard is dropped
/// while still held (an error returned early, or the sync future was
/// cancelled) a best-effort release is spawned on the current Tokio runtime.
/// Should that fail too, the lease lapses after [`LOCK_TTL`].
#[must_use = "the lock is released when the guard is dropped"]
pub struct LockGuard {
    client: WebDavClient,
    released: bool,
}

impl LockGuard {
    pub(crate) fn new(client: WebDavClient) -> Self {
        Self {
            client,
            released: false,
        }
    }

    /// Releases the lease.
    pub async fn release(mut self) {
        self.released = true;
        self.client.release_lock().await;
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("lock guard dropped while held, releasing in background");
                let client = self.client.clone();
                handle.spawn(async move {
                    client.release_lock().await;
                });
            }
            Err(_) => warn!(
                "lock guard dropped outside a runtime, lease expires after {:?}",
                LOCK_TTL
            ),
        }
    }
}
