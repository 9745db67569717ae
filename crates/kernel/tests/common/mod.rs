#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Remotes and gateway collaborators are scripted stubs; everything else is
//! the real kernel code. Scripted loads can be held behind a [`Notify`]
//! gate so tests decide the order in which sources resolve.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::Notify;
use tower::ServiceExt;

use navshell_kernel::gateway::{GatewayError, GatewayRoutesClient, ProfileClient};
use navshell_kernel::menu::{LoadState, MergedNavigationModel, NavigationAggregator};
use navshell_kernel::remote::{RemoteError, RemoteModuleLoader};
use navshell_kernel::session::Account;
use navshell_kernel::{AppState, Collaborators, Config, routes};
use navshell_sdk::gateway::{ProfileInfo, RouteTableEntry};
use navshell_sdk::types::{LocalizationUnit, NavigationManifest};

/// How long any test waits for background loads.
pub const WAIT: Duration = Duration::from_secs(5);

/// One scripted answer, optionally held until its gate opens.
#[derive(Clone)]
struct Step<T> {
    result: Result<T, RemoteError>,
    gate: Option<Arc<Notify>>,
}

/// Per-source queues of answers. The last answer of a queue repeats.
struct Script<T> {
    steps: Mutex<HashMap<String, VecDeque<Step<T>>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            steps: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn push(&self, source: &str, result: Result<T, RemoteError>, gate: Option<Arc<Notify>>) {
        self.steps
            .lock()
            .entry(source.to_string())
            .or_default()
            .push_back(Step { result, gate });
    }

    fn next(&self, source: &str) -> Option<Step<T>> {
        *self.calls.lock().entry(source.to_string()).or_default() += 1;

        let mut steps = self.steps.lock();
        let queue = steps.get_mut(source)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn calls(&self, source: &str) -> usize {
        self.calls.lock().get(source).copied().unwrap_or(0)
    }
}

async fn answer<T: Clone>(
    script: &Script<T>,
    source: &str,
    missing: RemoteError,
) -> Result<T, RemoteError> {
    let Some(step) = script.next(source) else {
        return Err(missing);
    };
    if let Some(gate) = step.gate {
        gate.notified().await;
    }
    step.result
}

/// Loader answering from per-source scripts.
///
/// Sources without a script are unavailable; localization without a script
/// is unavailable too.
pub struct ScriptedLoader {
    entries: Script<NavigationManifest>,
    localization: Script<LocalizationUnit>,
}

impl ScriptedLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Script::new(),
            localization: Script::new(),
        })
    }

    /// Queue a successful entries load.
    pub fn entries(&self, source: &str, manifest: NavigationManifest) {
        self.entries.push(source, Ok(manifest), None);
    }

    /// Queue a successful entries load that waits for the returned gate.
    pub fn gated_entries(&self, source: &str, manifest: NavigationManifest) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.entries.push(source, Ok(manifest), Some(gate.clone()));
        gate
    }

    /// Queue a failed entries load.
    pub fn entries_fail(&self, source: &str, error: RemoteError) {
        self.entries.push(source, Err(error), None);
    }

    pub fn localization(&self, source: &str, unit: LocalizationUnit) {
        self.localization.push(source, Ok(unit), None);
    }

    pub fn gated_localization(&self, source: &str, unit: LocalizationUnit) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.localization.push(source, Ok(unit), Some(gate.clone()));
        gate
    }

    pub fn localization_fail(&self, source: &str, error: RemoteError) {
        self.localization.push(source, Err(error), None);
    }

    pub fn entry_calls(&self, source: &str) -> usize {
        self.entries.calls(source)
    }

    pub fn localization_calls(&self, source: &str) -> usize {
        self.localization.calls(source)
    }
}

#[async_trait]
impl RemoteModuleLoader for ScriptedLoader {
    async fn fetch_entries(&self, remote: &str) -> Result<NavigationManifest, RemoteError> {
        answer(
            &self.entries,
            remote,
            RemoteError::unavailable(remote, "no script"),
        )
        .await
    }

    async fn fetch_localization(&self, remote: &str) -> Result<LocalizationUnit, RemoteError> {
        answer(
            &self.localization,
            remote,
            RemoteError::localization_unavailable(remote, "no script"),
        )
        .await
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Gateway and profile collaborator with settable answers.
pub struct StubGateway {
    routes: Mutex<Result<Vec<RouteTableEntry>, GatewayError>>,
    profile: Mutex<Result<ProfileInfo, GatewayError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    calls: AtomicUsize,
}

impl StubGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(Ok(Vec::new())),
            profile: Mutex::new(Err(GatewayError::unavailable("profile", "no script"))),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_routes(&self, routes: Result<Vec<RouteTableEntry>, GatewayError>) {
        *self.routes.lock() = routes;
    }

    pub fn set_profile(&self, profile: Result<ProfileInfo, GatewayError>) {
        *self.profile.lock() = profile;
    }

    /// Hold every following `find_all` until the returned gate opens.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayRoutesClient for StubGateway {
    async fn find_all(&self) -> Result<Vec<RouteTableEntry>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.routes.lock().clone()
    }
}

#[async_trait]
impl ProfileClient for StubGateway {
    async fn fetch_profile(&self) -> Result<ProfileInfo, GatewayError> {
        self.profile.lock().clone()
    }
}

/// A fully wired shell around scripted collaborators.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub loader: Arc<ScriptedLoader>,
    pub gateway: Arc<StubGateway>,
    _dir: TempDir,
}

impl TestApp {
    /// Shell with static entries [Home, Admin], remotes mfront1 and
    /// mfront2, and en/fr shell catalogs.
    pub async fn new(loader: Arc<ScriptedLoader>, gateway: Arc<StubGateway>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let nav_file = dir.path().join("navigation.toml");
        std::fs::write(
            &nav_file,
            r#"
                [[entries]]
                name = "Home"
                route = "/"
                translationKey = "global.menu.home"

                [[entries]]
                name = "Admin"
                route = "/admin"
                translationKey = "global.menu.admin.main"
                authorities = ["ROLE_ADMIN"]
            "#,
        )
        .unwrap();

        let i18n_dir = dir.path().join("i18n");
        std::fs::create_dir_all(&i18n_dir).unwrap();
        std::fs::write(
            i18n_dir.join("en.json"),
            r#"{"global.menu.home": "Home", "global.menu.admin.main": "Administration"}"#,
        )
        .unwrap();
        std::fs::write(
            i18n_dir.join("fr.json"),
            r#"{"global.menu.home": "Accueil", "global.menu.admin.main": "Administration"}"#,
        )
        .unwrap();

        let config = Config {
            remotes: vec!["mfront1".to_string(), "mfront2".to_string()],
            nav_file,
            i18n_dir,
            version: Some("v1.4.0".to_string()),
            ..Config::default()
        };

        let collaborators = Collaborators {
            loader: loader.clone(),
            gateway: gateway.clone(),
            profile: gateway.clone(),
        };
        let state = AppState::with_collaborators(&config, collaborators)
            .await
            .expect("state");
        let router = routes::router().with_state(state.clone());

        Self {
            state,
            router,
            loader,
            gateway,
            _dir: dir,
        }
    }

    /// Send a request to the app.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .request(Request::get(uri).body(Body::empty()).unwrap())
            .await;
        split_json(response).await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        split_json(self.request(request).await).await
    }

    pub async fn send_empty(&self, method: Method, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.request(request).await;
        let status = response.status();
        (status, body_string(response).await)
    }
}

pub async fn body_string(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn split_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = body_string(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    (status, value)
}

pub fn admin() -> Account {
    Account {
        login: "admin".to_string(),
        authorities: vec!["ROLE_ADMIN".to_string(), "ROLE_USER".to_string()],
    }
}

/// Wait until the published model satisfies `pred`.
pub async fn wait_for_model<F>(aggregator: &NavigationAggregator, pred: F) -> Arc<MergedNavigationModel>
where
    F: Fn(&MergedNavigationModel) -> bool,
{
    let mut rx = aggregator.watch();
    tokio::time::timeout(WAIT, async {
        loop {
            let model = rx.borrow_and_update().clone();
            if pred(&model) {
                return model;
            }
            rx.changed().await.unwrap();
        }
    })
    .await
    .expect("model reached the expected state")
}

/// Wait until no source is loading.
pub async fn settled(aggregator: &NavigationAggregator) -> Arc<MergedNavigationModel> {
    wait_for_model(aggregator, |m| {
        m.revision > 0 && m.remotes.iter().all(|r| r.state != LoadState::Loading)
    })
    .await
}

/// Poll `check` until it holds.
pub async fn eventually<F: Fn() -> bool>(check: F) {
    tokio::time::timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition reached");
}
