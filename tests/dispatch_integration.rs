//! Dispatch through the runner: validation order, session gating and the
//! CI token bypass.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stallion::auth::{AuthError, LoginStrategy};
use stallion::cli::commands::builtin_registry;
use stallion::engine::{Context, ErrorCode, OptionMap, Runner};
use stallion::secrets::{FileTokenStore, TokenEntry, TokenStore, CLI_SLOT};

use common::RnProject;

/// Login that records calls and always fails.
#[derive(Default)]
struct CountingLogin {
    calls: AtomicUsize,
}

#[async_trait]
impl LoginStrategy for CountingLogin {
    async fn login(&self) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::CallbackTimeout)
    }
}

struct Harness {
    server: MockServer,
    home: TempDir,
    store: FileTokenStore,
    login: CountingLogin,
}

impl Harness {
    async fn new() -> Self {
        let home = TempDir::new().unwrap();
        let store = FileTokenStore::with_path(home.path().join("token-store.json"));
        Self {
            server: MockServer::start().await,
            home,
            store,
            login: CountingLogin::default(),
        }
    }

    fn context(&self, cwd: &std::path::Path) -> Context {
        let mut ctx = Context::new(cwd);
        ctx.config.api_url = self.server.uri();
        ctx
    }

    async fn run(&self, cwd: &std::path::Path, name: &str, options: OptionMap) -> (ErrorCode, String) {
        let registry = builtin_registry().unwrap();
        let ctx = self.context(cwd);
        let runner = Runner::new(&registry, &ctx, &self.store, &self.login);
        let result = runner.execute(name, options).await;
        (result.code(), result.message().unwrap_or_default().to_string())
    }

    fn login_calls(&self) -> usize {
        self.login.calls.load(Ordering::SeqCst)
    }

    async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap().len()
    }
}

fn publish_options() -> OptionMap {
    OptionMap::new()
        .with_text("platform", "android")
        .with_text("upload-path", "/v1")
        .with_text("release-note", "x")
}

#[tokio::test]
async fn publish_outside_project_touches_nothing() {
    let h = Harness::new().await;
    let cwd = TempDir::new().unwrap();

    let (code, message) = h.run(cwd.path(), "publish-bundle", publish_options()).await;

    assert_eq!(code, ErrorCode::InvalidParameter);
    assert_eq!(message, "No react native project found in current directory");
    assert_eq!(h.login_calls(), 0);
    assert_eq!(h.request_count().await, 0);
    assert!(!h.home.path().join("token-store.json").exists());
}

#[tokio::test]
async fn missing_options_are_reported_before_anything_else() {
    let h = Harness::new().await;
    let cwd = TempDir::new().unwrap();
    let options = OptionMap::new().with_text("platform", "android");

    let (code, message) = h.run(cwd.path(), "pb", options).await;

    assert_eq!(code, ErrorCode::InvalidParameter);
    assert_eq!(
        message,
        "Missing required options: --upload-path, --release-note"
    );
    assert_eq!(h.login_calls(), 0);
    assert_eq!(h.request_count().await, 0);
}

#[tokio::test]
async fn missing_entry_file_is_not_found() {
    let h = Harness::new().await;
    let project = RnProject::new("0.74.1");
    let options = publish_options().with_text("entry-file", "src/missing.js");

    let (code, message) = h.run(project.path(), "publish-bundle", options).await;

    assert_eq!(code, ErrorCode::NotFound);
    assert_eq!(message, "Entry file \"src/missing.js\" does not exist.");
    assert_eq!(h.login_calls(), 0);
}

#[tokio::test]
async fn no_stored_session_starts_login() {
    let h = Harness::new().await;
    let project = RnProject::new("0.74.1");

    let (code, message) = h.run(project.path(), "publish-bundle", publish_options()).await;

    assert_eq!(code, ErrorCode::NotLoggedIn);
    assert!(message.starts_with("Login failed: "), "{}", message);
    assert_eq!(h.login_calls(), 1);
    assert_eq!(h.request_count().await, 0);
}

#[tokio::test]
async fn rejected_session_falls_back_to_login() {
    let h = Harness::new().await;
    Mock::given(method("GET"))
        .and(path("/auth/user-profile"))
        .and(header("x-access-token", "stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    h.store.set(CLI_SLOT, TokenEntry::new("stale-token")).unwrap();
    let project = RnProject::new("0.74.1");

    let (code, _) = h.run(project.path(), "publish-bundle", publish_options()).await;

    assert_eq!(code, ErrorCode::NotLoggedIn);
    assert_eq!(h.login_calls(), 1);
}

#[tokio::test]
async fn ci_token_skips_the_session_gate() {
    let h = Harness::new().await;
    Mock::given(method("POST"))
        .and(path("/cli/ci/update-release"))
        .and(header("x-ci-token", "ci-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&h.server)
        .await;
    let cwd = TempDir::new().unwrap();
    let options = OptionMap::new()
        .with_text("project-id", "p1")
        .with_text("hash", "abc")
        .with_text("ci-token", "ci-secret");

    let (code, message) = h.run(cwd.path(), "update-release", options).await;

    assert_eq!(code, ErrorCode::Succeeded, "{}", message);
    assert_eq!(h.login_calls(), 0);
}

#[tokio::test]
async fn logout_removes_the_stored_session() {
    let h = Harness::new().await;
    h.store.set(CLI_SLOT, TokenEntry::new("some-token")).unwrap();
    let cwd = TempDir::new().unwrap();

    let (code, _) = h.run(cwd.path(), "logout", OptionMap::new()).await;

    assert_eq!(code, ErrorCode::Succeeded);
    assert_eq!(h.store.token(CLI_SLOT).unwrap(), None);
    assert_eq!(h.request_count().await, 0);
}

#[tokio::test]
async fn unknown_and_illegal_commands() {
    let h = Harness::new().await;
    let cwd = TempDir::new().unwrap();

    let (code, message) = h.run(cwd.path(), "deploy", OptionMap::new()).await;
    assert_eq!(code, ErrorCode::NoSuchCommand);
    assert!(message.ends_with("Use \"stallion help\" to list all available commands"));

    let (code, _) = h.run(cwd.path(), "-x", OptionMap::new()).await;
    assert_eq!(code, ErrorCode::IllegalCommand);
}
