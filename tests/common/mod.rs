#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::Utc;
use jumpgate::domain::entities::{AccessLogEntry, RedirectKind, RedirectRule};
use jumpgate::domain::repositories::RuleRepository;
use jumpgate::infrastructure::access_log::{AccessLogSettings, AccessLogger};
use jumpgate::infrastructure::persistence::InMemoryRuleStore;
use jumpgate::routes::app_router;
use jumpgate::state::AppState;
use jumpgate::utils::rule_id::generate_rule_id;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::Layer;

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// A running router over a fresh store, with its files in a temp directory.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub store: Arc<InMemoryRuleStore>,
    pub dir: TempDir,
}

impl TestApp {
    pub fn rules_file(&self) -> PathBuf {
        self.dir.path().join("rules.json")
    }

    pub fn access_log_file(&self) -> PathBuf {
        self.dir.path().join("access.log")
    }

    /// Flushes the access logger and returns every entry written so far.
    pub async fn access_log(&self) -> Vec<AccessLogEntry> {
        self.state.access_logger.flush().await.unwrap();
        let content = std::fs::read_to_string(self.access_log_file()).unwrap();
        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

pub async fn create_test_app(admin_token: Option<&str>) -> TestApp {
    create_test_app_with_rules(admin_token, Vec::new()).await
}

pub async fn create_test_app_with_rules(
    admin_token: Option<&str>,
    rules: Vec<RedirectRule>,
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let store = Arc::new(InMemoryRuleStore::new());
    for rule in rules {
        store.set(rule).await;
    }

    let settings = AccessLogSettings {
        buffer_size: 100,
        flush_interval: Duration::from_secs(3600),
        queue_capacity: 1000,
    };
    let access_logger = AccessLogger::open(&dir.path().join("access.log"), settings)
        .await
        .unwrap();

    let state = AppState::new(
        store.clone(),
        dir.path().join("rules.json"),
        access_logger,
        admin_token.map(str::to_string),
    );

    let app = app_router(state.clone()).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        state,
        store,
        dir,
    }
}

pub fn rule(domain: &str, path: &str, target: &str, kind: RedirectKind) -> RedirectRule {
    RedirectRule {
        id: generate_rule_id(domain, path),
        domain: domain.to_string(),
        path: path.to_string(),
        target: target.to_string(),
        kind,
        expires_at: None,
        created_at: Utc::now(),
        description: String::new(),
    }
}
