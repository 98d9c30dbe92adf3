//! WebDAV store configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection settings for one remote WebDAV store.
#[derive(Clone, Serialize, Deserialize)]
pub struct WebDavConfig {
    /// Collection holding the index, lock and backup files
    /// (e.g., "https://dav.example.com/remote.php/dav/files/me/PassVault").
    pub base_url: String,

    /// HTTP Basic auth user.
    pub username: String,

    /// HTTP Basic auth password.
    pub password: String,

    /// Accept self-signed or otherwise untrusted TLS certificates.
    #[serde(default)]
    pub allow_untrusted_certificate: bool,

    /// Permit plain `http://` URLs.
    #[serde(default)]
    pub allow_cleartext: bool,

    /// Per-request timeout enforced by the HTTP transport.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for WebDavConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            allow_untrusted_certificate: false,
            allow_cleartext: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WebDavConfig {
    /// URL of the store's collection, with a trailing slash.
    pub fn collection_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// URL of a file directly inside the store's collection.
    pub fn file_url(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url.trim_end_matches('/'))
    }

    /// True if the store is reached over plain HTTP.
    pub fn is_cleartext(&self) -> bool {
        self.base_url
            .get(..7)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://"))
    }

    /// Creates a config for testing against a local server.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            base_url: "http://localhost:8080/dav".to_string(),
            username: "passvault".to_string(),
            password: "passvault-test".to_string(),
            allow_untrusted_certificate: true,
            allow_cleartext: true,
            request_timeout_secs: 5,
        }
    }
}

impl fmt::Debug for WebDavConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDavConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("allow_untrusted_certificate", &self.allow_untrusted_certificate)
            .field("allow_cleartext", &self.allow_cleartext)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
