#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use expense_api::auth::JwtKeys;
use expense_api::config::AppConfig;
use expense_api::database::MemoryExpenseStore;
use expense_api::AppState;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Router backed by a fresh in-memory store
pub struct TestApp {
    pub router: Router,
    pub keys: JwtKeys,
    pub store: Arc<MemoryExpenseStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 4 * 1024;

        let keys = JwtKeys::new(TEST_SECRET, 1).expect("test keys");
        let store = Arc::new(MemoryExpenseStore::new());
        let state = AppState::new(store.clone(), keys.clone());

        Self {
            router: expense_api::app(state, &config),
            keys,
            store,
        }
    }

    pub fn token(&self, user_id: i64) -> String {
        self.keys.issue(user_id).expect("issue token")
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        TestResponse {
            status,
            body: bytes.to_vec(),
        }
    }

    /// POST an expense as `user_id` and return its id
    pub async fn create(&self, user_id: i64, title: &str, amount: f64) -> i64 {
        let token = self.token(user_id);
        let res = self
            .send(
                Method::POST,
                "/expense/",
                Some(&token),
                Some(serde_json::json!({ "title": title, "amount": amount })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.text());
        res.json()["id"].as_i64().expect("numeric id")
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({}): {}", e, self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

// --- Spawned server (needs DATABASE_URL) ---

/// Server binary owned by one test; the process is killed when this drops
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_expense-api"));
        cmd.env("EXPENSE_API_PORT", port.to_string())
            .env("JWT_SECRET_KEY", TEST_SECRET)
            .env("APP_ENV", "development")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a server for the calling test; `None` when DATABASE_URL is not configured
pub async fn spawn_server() -> Result<Option<TestServer>> {
    if std::env::var("DATABASE_URL").map(|v| v.trim().is_empty()).unwrap_or(true) {
        eprintln!("DATABASE_URL not set; skipping spawned-server test");
        return Ok(None);
    }

    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}
