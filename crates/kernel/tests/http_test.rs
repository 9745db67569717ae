//! HTTP surface tests.
//!
//! Every request goes through the real router via `oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use navshell_kernel::gateway::GatewayError;
use navshell_kernel::remote::RemoteError;
use navshell_test_utils::assert::{contains, entry_names, has_key};
use navshell_test_utils::{test_manifest, test_profile, test_route, test_unit};

use common::{ScriptedLoader, StubGateway, TestApp, body_string, eventually, settled};

async fn app() -> TestApp {
    let loader = ScriptedLoader::new();
    loader.entries("mfront1", test_manifest(&["Products"]));
    loader.localization(
        "mfront1",
        test_unit(
            "mfront1",
            &[("en", "Products", "Products"), ("fr", "Products", "Produits")],
        ),
    );
    loader.entries_fail("mfront2", RemoteError::unavailable("mfront2", "connection refused"));
    TestApp::new(loader, StubGateway::new()).await
}

async fn ready(app: &TestApp) {
    let (status, body) = app
        .send_json(
            Method::POST,
            "/api/session/ready",
            json!({"login": "admin", "authorities": ["ROLE_ADMIN"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["activated"], true);
    settled(app.state.aggregator()).await;
}

#[tokio::test]
async fn health_is_ok_with_failed_remotes() {
    let app = app().await;
    ready(&app).await;

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["loaded"], 1);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn navigation_before_session_has_static_entries() {
    let app = app().await;

    let (status, body) = app.get_json("/api/navigation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry_names(&body), vec!["Home", "Admin"]);
    assert_eq!(body["model"]["remotes"][0]["state"], "not_started");
    assert_eq!(body["version"], "v1.4.0");
    assert!(body["in_production"].is_null());
}

#[tokio::test]
async fn navigation_after_session_ready() {
    let app = app().await;
    ready(&app).await;

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(entry_names(&body), vec!["Home", "Admin", "Products"]);
    assert_eq!(body["entries"][2]["source"], "mfront1");
    assert!(body["entries"][0]["source"].is_null());
    assert_eq!(body["model"]["remotes"][1]["state"], "failed");
    assert_eq!(body["model"]["remotes"][1]["entries"], json!([]));

    let (_, body) = app
        .send_json(
            Method::POST,
            "/api/session/ready",
            json!({"login": "admin", "authorities": []}),
        )
        .await;
    assert_eq!(body["epoch"], 2);
}

#[tokio::test]
async fn navigation_filters_by_authorities() {
    let app = app().await;
    ready(&app).await;

    let (_, body) = app.get_json("/api/navigation?authorities=ROLE_USER").await;
    assert_eq!(entry_names(&body), vec!["Home", "Products"]);

    let (_, body) = app
        .get_json("/api/navigation?authorities=ROLE_USER,ROLE_ADMIN")
        .await;
    assert_eq!(entry_names(&body), vec!["Home", "Admin", "Products"]);
}

#[tokio::test]
async fn labels_follow_locale() {
    let app = app().await;
    ready(&app).await;
    eventually(|| app.state.translations().installed("mfront1").is_some()).await;

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(body["locale"], "en");
    assert_eq!(body["entries"][0]["label"], "Home");

    let (status, body) = app.send_empty(Method::PUT, "/api/locale/fr").await;
    assert_eq!(status, StatusCode::OK);
    contains(&body, "\"locale\":\"fr\"");

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(body["entries"][0]["label"], "Accueil");
    // Entries without a translation key are labelled by name
    assert_eq!(body["entries"][2]["label"], "Products");

    let (_, catalog) = app.get_json("/api/i18n").await;
    assert_eq!(catalog["locale"], "fr");
    assert_eq!(catalog["translations"]["global.menu.home"], "Accueil");
    assert_eq!(catalog["translations"]["Products"], "Produits");
}

#[tokio::test]
async fn unknown_locale_is_not_found() {
    let app = app().await;
    let (status, body) = app.send_empty(Method::PUT, "/api/locale/de").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    contains(&body, "en, fr");
    assert_eq!(app.state.translations().current_locale(), "en");
}

#[tokio::test]
async fn ready_requires_login() {
    let app = app().await;
    let (status, _) = app
        .send_json(Method::POST, "/api/session/ready", json!({"login": " "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.state.session().current().is_ready());
}

#[tokio::test]
async fn sign_out_keeps_navigation() {
    let app = app().await;
    ready(&app).await;

    let (status, _) = app.send_empty(Method::POST, "/api/session/signed-out").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!app.state.session().current().is_ready());

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(entry_names(&body), vec!["Home", "Admin", "Products"]);
}

#[tokio::test]
async fn source_status_and_reload() {
    let app = app().await;
    ready(&app).await;

    let (status, body) = app.get_json("/api/navigation/sources").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "mfront1");
    assert_eq!(body[0]["entries"], 1);
    assert_eq!(body[1]["state"], "failed");
    has_key(&body[1], "last_error");

    let (status, _) = app
        .send_empty(Method::POST, "/api/navigation/sources/mfront2/reload")
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    eventually(|| app.loader.entry_calls("mfront2") == 2).await;

    let (status, _) = app
        .send_empty(Method::POST, "/api/navigation/sources/nope/reload")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalidate_source_drops_entries() {
    let app = app().await;
    ready(&app).await;

    let (status, _) = app
        .send_empty(Method::DELETE, "/api/navigation/sources/mfront1")
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(entry_names(&body), vec!["Home", "Admin"]);

    let (status, _) = app
        .send_empty(Method::DELETE, "/api/navigation/sources/nope")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_routes_refresh() {
    let app = app().await;
    app.gateway.set_routes(Ok(vec![
        test_route("mfront1", true),
        test_route("mfront2", true),
        test_route("uaa", true),
    ]));
    let gate = app.gateway.hold();

    let (status, body) = app.get_json("/api/gateway/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updating"], false);
    assert_eq!(body["routes"], json!([]));

    let (status, body) = app
        .send_json(Method::POST, "/api/gateway/routes/refresh", json!({}))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["updating"], true);

    gate.notify_one();
    eventually(|| !app.state.gateway().is_updating()).await;

    let (_, body) = app.get_json("/api/gateway/routes").await;
    assert_eq!(body["updating"], false);
    assert_eq!(body["routes"].as_array().unwrap().len(), 3);
    assert_eq!(body["routes"][0]["serviceId"], "mfront1");
}

#[tokio::test]
async fn gateway_error_keeps_routes() {
    let app = app().await;
    app.gateway.set_routes(Ok(vec![test_route("mfront1", true)]));
    app.state.gateway().refresh().await.unwrap();

    app.gateway
        .set_routes(Err(GatewayError::unavailable("gateway", "HTTP 503")));
    app.send_empty(Method::POST, "/api/gateway/routes/refresh")
        .await;
    eventually(|| !app.state.gateway().is_updating()).await;

    let (_, body) = app.get_json("/api/gateway/routes").await;
    assert_eq!(body["routes"].as_array().unwrap().len(), 1);
    contains(body["last_error"].as_str().unwrap(), "HTTP 503");
}

#[tokio::test]
async fn profile_flags_are_shown_once_known() {
    let app = app().await;
    app.gateway.set_profile(Ok(test_profile(&["prod", "api-docs"])));
    assert!(app.state.refresh_profile().await);

    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(body["in_production"], true);
    assert_eq!(body["open_api_enabled"], true);

    app.gateway
        .set_profile(Err(GatewayError::unavailable("profile", "down")));
    assert!(!app.state.refresh_profile().await);
    let (_, body) = app.get_json("/api/navigation").await;
    assert_eq!(body["in_production"], true);
}

#[tokio::test]
async fn metrics_expose_remote_loads() {
    let app = app().await;
    ready(&app).await;

    let response = app
        .request(Request::get("/metrics").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = body_string(response).await;
    contains(&body, "remote_loads_total");
    contains(&body, "source=\"mfront2\"");
    contains(&body, "outcome=\"unavailable\"");
    contains(&body, "navigation_entries 3");
}
