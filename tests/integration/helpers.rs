//! Test helpers for integration tests.

use std::net::SocketAddr;

use caspar::app::Site;
use caspar::bootstrap::Bootstrap;
use caspar::config::{CacheConfig, Config, FrameworkConfig, LogFormat, LoggingConfig, ServerConfig};
use caspar::server::Server;
use reqwest::{Client, Response, StatusCode};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// In-process server bound to 127.0.0.1 on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    handle: JoinHandle<()>,
    _install_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        let install_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            server: ServerConfig::new("127.0.0.1:0".parse().unwrap()),
            framework: FrameworkConfig {
                base_path: Some(install_dir.path().to_path_buf()),
                ..FrameworkConfig::default()
            },
            cache: CacheConfig::default(),
            logging: LoggingConfig {
                filter: "caspar=warn".into(),
                service_name: "caspar".into(),
                format: LogFormat::Json,
            },
        };

        let bootstrap = Bootstrap::from_config(&config).expect("Failed to bootstrap");
        bootstrap.initialize().expect("Failed to initialize install dir");

        let site = Site::new(bootstrap.session_name());
        let server = Server::bind(&config.server, bootstrap, site)
            .await
            .expect("Failed to bind server");
        let addr: SocketAddr = server.local_addr().expect("No local address");

        let handle = tokio::spawn(async move {
            let _ = server.run().await;
        });

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{}", addr),
            client,
            handle,
            _install_dir: install_dir,
        }
    }

    /// Make GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Failed to send request")
    }

    /// Make GET request with custom headers
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Response {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("Failed to send request")
    }

    /// Make AJAX-style GET request
    pub async fn get_ajax(&self, path: &str) -> Response {
        self.get_with_headers(path, &[("X-Requested-With", "XMLHttpRequest")])
            .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = header(response, name);
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Assert that response contains header with prefix
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = header(response, name);
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Header value as a string, panicking when absent
pub fn header<'a>(response: &'a Response, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap()
}

/// Assert that response body contains substring
pub async fn assert_body_contains(response: Response, substring: &str) {
    let body = response.text().await.expect("Failed to read body");
    assert!(
        body.contains(substring),
        "Body does not contain '{}'. Body: {}",
        substring,
        &body[..body.len().min(500)]
    );
}
