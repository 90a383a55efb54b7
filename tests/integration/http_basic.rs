//! Basic request/response tests.

use reqwest::StatusCode;

use super::helpers::*;

#[tokio::test]
async fn test_index_returns_html() {
    let server = TestServer::start().await;
    let resp = server.get("/").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "text/html; charset=utf-8");
    assert_body_contains(resp, "<title>Welcome</title>").await;
}

#[tokio::test]
async fn test_no_cache_headers() {
    let server = TestServer::start().await;
    let resp = server.get("/").await;

    assert_header(&resp, "expires", "Mon, 26 Jul 1997 05:00:00 GMT");
    assert_header(&resp, "cache-control", "no-cache, must-revalidate");
    assert_header(&resp, "pragma", "no-cache");
    assert!(header(&resp, "last-modified").ends_with(" GMT"));
}

#[tokio::test]
async fn test_assets_keep_priority_order() {
    let server = TestServer::start().await;
    let body = server.get("/").await.text().await.unwrap();

    let proto = body.find("/js/prototype.js").expect("prototype.js missing");
    let main = body.find("/js/main.js").expect("main.js missing");
    assert!(proto < main, "important script should come first");
    assert!(body.contains("/css/main.css"));
    assert!(body.contains("application/rss+xml"));
}

#[tokio::test]
async fn test_json_format() {
    let server = TestServer::start().await;
    let resp = server.get("/?format=json").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "application/json; charset=utf-8");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["page"], "home");
    assert_eq!(body["title"], "Welcome");
}

#[tokio::test]
async fn test_rss_format() {
    let server = TestServer::start().await;
    let resp = server.get("/?format=rss").await;

    assert_header_starts_with(&resp, "content-type", "application/xml");
    assert_body_contains(resp, "<rss version=\"2.0\">").await;
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;
    let resp = server.get("/health").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_path_is_404_html() {
    let server = TestServer::start().await;
    let resp = server.get("/no/such/page").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_header_starts_with(&resp, "content-type", "text/html");
    assert_body_contains(resp, "does not exist").await;
}

#[tokio::test]
async fn test_unknown_path_other_format_is_404_html() {
    let server = TestServer::start().await;
    let resp = server.get("/no/such/page?format=xml").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_header(&resp, "content-type", "text/html; charset=utf-8");
    assert_body_contains(resp, "<!DOCTYPE html>").await;
}
