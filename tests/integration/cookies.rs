//! Session cookie lifecycle.

use super::helpers::*;

#[tokio::test]
async fn test_first_visit_sets_session_cookie() {
    let server = TestServer::start().await;
    let resp = server.get("/").await;

    let cookie = header(&resp, "set-cookie");
    assert!(cookie.starts_with("CASPAR="), "got {}", cookie);
    assert!(cookie.contains("path=/"));
    assert!(cookie.contains("expires="));
}

#[tokio::test]
async fn test_returning_visit_keeps_cookie() {
    let server = TestServer::start().await;
    let resp = server
        .get_with_headers("/", &[("Cookie", "CASPAR=abc123")])
        .await;

    assert!(resp.headers().get("set-cookie").is_none());
}

#[tokio::test]
async fn test_logout_expires_cookie() {
    let server = TestServer::start().await;
    let resp = server.get("/logout").await;

    let cookie = header(&resp, "set-cookie");
    assert!(cookie.starts_with("CASPAR="), "got {}", cookie);
    assert!(cookie.contains("Max-Age=0"), "got {}", cookie);
}
