//! Redirect handling.

use reqwest::StatusCode;

use super::helpers::*;

#[tokio::test]
async fn test_logout_redirects_home() {
    let server = TestServer::start().await;
    let resp = server.get("/logout").await;

    assert_status(&resp, StatusCode::FOUND);
    assert_header(&resp, "location", "/");
}

#[tokio::test]
async fn test_redirect_body_is_empty() {
    let server = TestServer::start().await;
    let resp = server.get("/logout").await;

    let body = resp.bytes().await.unwrap();
    assert!(body.is_empty(), "redirect body should be empty, got {:?}", body);
}
