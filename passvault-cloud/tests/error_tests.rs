use passvault_cloud::{CloudError, WebDavError};
use pretty_assertions::assert_eq;

fn status(code: u16) -> WebDavError {
    WebDavError::Status {
        method: "GET".into(),
        url: "https://dav.example.com/vaults/index.2faspass".into(),
        status: code,
    }
}

// --- WebDavError ---

#[test]
fn status_error_display() {
    assert_eq!(
        status(401).to_string(),
        "GET https://dav.example.com/vaults/index.2faspass returned HTTP 401"
    );
}

#[test]
fn not_found_is_detected_by_status() {
    assert!(status(404).is_not_found());
    assert!(!status(410).is_not_found());
    assert_eq!(status(503).status(), Some(503));
    assert_eq!(WebDavError::InvalidRequest("x".into()).status(), None);
}

#[test]
fn cleartext_error_display() {
    let err = WebDavError::CleartextNotPermitted("http://nas.local/dav".into());
    assert_eq!(
        err.to_string(),
        "cleartext HTTP is not permitted for http://nas.local/dav"
    );
}

// --- CloudError ---

#[test]
fn cloud_error_display() {
    assert_eq!(
        CloudError::FileIsLocked.to_string(),
        "remote vault store is locked by another device"
    );
    assert_eq!(
        CloudError::CleartextNotPermitted.to_string(),
        "cleartext HTTP traffic is not permitted"
    );
    assert_eq!(
        CloudError::Authentication("nope".into()).to_string(),
        "authentication failed: nope"
    );
    assert_eq!(CloudError::Unknown("boom".into()).to_string(), "sync failed: boom");
}

#[test]
fn merge_error_is_transparent() {
    let err = CloudError::from(anyhow::anyhow!("vault key rejected by user"));
    assert_eq!(err.to_string(), "vault key rejected by user");
    assert!(matches!(err, CloudError::Merge(_)));
}

#[test]
fn only_lock_contention_is_retryable() {
    assert!(CloudError::FileIsLocked.is_retryable());
    assert!(!CloudError::Authentication("x".into()).is_retryable());
    assert!(!CloudError::Unknown("x".into()).is_retryable());
}

// --- Mapping ---

#[test]
fn http_status_maps_to_authentication() {
    let err = CloudError::from(status(401));
    match err {
        CloudError::Authentication(msg) => assert!(msg.contains("HTTP 401")),
        other => panic!("expected Authentication, got {other:?}"),
    }
}

#[test]
fn cleartext_maps_to_cleartext() {
    let err = CloudError::from(WebDavError::CleartextNotPermitted("http://x".into()));
    assert!(matches!(err, CloudError::CleartextNotPermitted));
}

#[test]
fn local_failures_map_to_unknown() {
    let err = CloudError::from(WebDavError::InvalidRequest("method MOVE".into()));
    assert!(matches!(err, CloudError::Unknown(_)));

    let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
    let err = CloudError::from(WebDavError::from(json_err));
    assert!(matches!(err, CloudError::Unknown(_)));
}
