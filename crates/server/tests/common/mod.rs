//! Common test utilities for API testing with a mock document client.
//!
//! The fixture builds the real router around an in-memory session store and
//! an orchestrator backed by [`MockDocumentClient`], so every endpoint can be
//! exercised in-process without a document service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use docbridge_core::{
    testing::MockDocumentClient, Config, DocumentClient, DocumentProcessor, InMemorySessionStore,
    Orchestrator, OrchestratorConfig, ProcessorConfig, ServerConfig, SessionStore,
};

/// Re-export fixtures for test convenience
pub use docbridge_core::testing::fixtures;

/// Test fixture for API testing with a mock document client.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_run() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/integration/run", json!({
///         "loanNumber": "LN-1"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock document client - script documents, failures and latency
    pub client: Arc<MockDocumentClient>,
    /// Session store behind the launch endpoints
    pub sessions: Arc<dyn SessionStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    /// Body parsed as JSON, `Null` when it is not JSON
    pub body: Value,
    /// Raw body text
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Use a simulated-mode mock instead of a live-mode one
    pub simulated: bool,
    /// Session lifetime
    pub session_ttl: Duration,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            simulated: false,
            session_ttl: Duration::from_secs(1800),
        }
    }
}

impl TestConfig {
    /// Sessions that expire almost immediately.
    pub fn with_session_ttl(ttl: Duration) -> Self {
        Self {
            session_ttl: ttl,
            ..Default::default()
        }
    }

    pub fn simulated() -> Self {
        Self {
            simulated: true,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with a live-mode mock client.
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    /// Create a test fixture with custom configuration.
    pub fn with_config(test_config: TestConfig) -> Self {
        let client = Arc::new(if test_config.simulated {
            MockDocumentClient::simulated()
        } else {
            MockDocumentClient::new()
        });

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 3000,
                public_url: Some("https://bridge.test".to_string()),
            },
            orchestrator: OrchestratorConfig {
                upload_auth_delay_ms: 0,
                upload_receive_delay_ms: 0,
                history_limit: 0,
            },
            ..Default::default()
        };

        let processor = DocumentProcessor::new(ProcessorConfig {
            delay_ms: 0,
            ..Default::default()
        });
        let orchestrator = Arc::new(Orchestrator::new(
            config.orchestrator.clone(),
            Arc::clone(&client) as Arc<dyn DocumentClient>,
            processor,
        ));
        let sessions: Arc<dyn SessionStore> =
            Arc::new(InMemorySessionStore::new(test_config.session_ttl));

        let state = Arc::new(docbridge_server::state::AppState::new(
            config,
            orchestrator,
            Arc::clone(&sessions),
        ));
        let router = docbridge_server::api::create_router(state);

        Self {
            router,
            client,
            sessions,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.request("POST", path, Some(bytes), Some("application/json"))
            .await
    }

    /// Send a POST request with an XML body.
    pub async fn post_xml(&self, path: &str, body: &str) -> TestResponse {
        self.request(
            "POST",
            path,
            Some(body.as_bytes().to_vec()),
            Some("application/xml"),
        )
        .await
    }

    /// Send a POST request with raw bytes and a custom content type.
    pub async fn post_bytes(&self, path: &str, body: Vec<u8>, content_type: &str) -> TestResponse {
        self.request("POST", path, Some(body), Some(content_type))
            .await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None, None).await
    }

    /// Poll the status endpoint until no job is running.
    pub async fn wait_for_idle(&self) -> TestResponse {
        for _ in 0..100 {
            let response = self.get("/api/integration/status").await;
            if response.body["running"] == false {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Job did not finish in time");
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Vec<u8>>,
        content_type: Option<&str>,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            request_builder = request_builder.header("Content-Type", content_type);
        }

        let body = match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        };
        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            content_type,
            body,
            text,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.text
        );
    };
}
