//! AJAX responses: JSON bodies, status codes, no redirects.

use reqwest::StatusCode;

use super::helpers::*;

#[tokio::test]
async fn test_ajax_not_found_is_json() {
    let server = TestServer::start().await;
    let resp = server.get_ajax("/missing").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_header_starts_with(&resp, "content-type", "application/json");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_json_format_not_found_is_json() {
    let server = TestServer::start().await;
    let resp = server.get("/missing?format=json").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_ajax_redirect_has_no_location() {
    let server = TestServer::start().await;
    let resp = server.get_ajax("/logout").await;

    assert_status(&resp, StatusCode::FOUND);
    assert!(resp.headers().get("location").is_none());
}
