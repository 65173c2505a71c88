use super::*;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct StatusBackend {
    active_database: Arc<Mutex<Option<String>>>,
    active_repositories: Arc<Mutex<Option<Vec<String>>>>,
    database_gets: Arc<Mutex<u32>>,
    repository_gets: Arc<Mutex<u32>>,
    fail_database: Arc<Mutex<bool>>,
    fail_repositories: Arc<Mutex<bool>>,
}

async fn serve_active_database(
    State(state): State<StatusBackend>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    *state.database_gets.lock().await += 1;
    if *state.fail_database.lock().await {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let value = state.active_database.lock().await.clone();
    Ok(Json(serde_json::json!({ "active_database": value })))
}

async fn serve_active_repositories(
    State(state): State<StatusBackend>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    *state.repository_gets.lock().await += 1;
    if *state.fail_repositories.lock().await {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let value = state.active_repositories.lock().await.clone();
    Ok(Json(serde_json::json!({ "active_repositories": value })))
}

async fn spawn_status_backend() -> anyhow::Result<(String, StatusBackend)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = StatusBackend::default();
    let app = Router::new()
        .route("/active-database/", get(serve_active_database))
        .route("/active-repository/", get(serve_active_repositories))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), state))
}

fn store_for(url: &str) -> (Arc<ActiveStateStore>, broadcast::Receiver<ConsoleEvent>) {
    let (events, rx) = broadcast::channel(16);
    let store = Arc::new(ActiveStateStore::new(reqwest::Client::new(), url, events));
    (store, rx)
}

#[tokio::test]
async fn refresh_applies_backend_values_and_clears_loading() {
    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    *backend.active_database.lock().await = Some("kb".to_string());
    *backend.active_repositories.lock().await =
        Some(vec!["wikidata".to_string(), "geo".to_string()]);

    let (store, _rx) = store_for(&url);
    store.refresh_database().await;
    store.refresh_repositories().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_database.as_deref(), Some("kb"));
    assert_eq!(
        snapshot.active_repositories,
        Some(vec!["wikidata".to_string(), "geo".to_string()])
    );
    assert!(!snapshot.database_loading);
    assert!(!snapshot.repositories_loading);
    assert!(snapshot.database_fetched_at.is_some());
    assert!(snapshot.repositories_fetched_at.is_some());
}

#[tokio::test]
async fn backend_null_and_empty_list_map_to_absent_and_empty() {
    let (url, _backend) = spawn_status_backend().await.expect("spawn backend");
    // Backend defaults: database null, repositories null.
    let (store, _rx) = store_for(&url);
    store.refresh_database().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_database, None);
    assert!(!snapshot.database_loading);

    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    *backend.active_repositories.lock().await = Some(Vec::new());
    let (store, _rx) = store_for(&url);
    store.refresh_repositories().await;

    // An empty list is a present-but-empty view, distinct from null.
    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_repositories, Some(Vec::new()));
    assert!(!snapshot.repositories_loading);
}

#[tokio::test]
async fn failed_refresh_retains_prior_value() {
    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    *backend.active_database.lock().await = Some("kb".to_string());

    let (store, _rx) = store_for(&url);
    store.refresh_database().await;
    assert_eq!(
        store.snapshot().await.active_database.as_deref(),
        Some("kb")
    );

    *backend.fail_database.lock().await = true;
    store.refresh_database().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_database.as_deref(), Some("kb"));
    assert!(!snapshot.database_loading);
    assert_eq!(*backend.database_gets.lock().await, 2);
}

#[tokio::test]
async fn unreachable_backend_clears_loading_without_panicking() {
    // Nothing listens on this port; the refresh must swallow the transport
    // error and leave a clean snapshot behind.
    let (store, _rx) = store_for("http://127.0.0.1:9");
    store.refresh_database().await;
    store.refresh_repositories().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_database, None);
    assert_eq!(snapshot.active_repositories, None);
    assert!(!snapshot.database_loading);
    assert!(!snapshot.repositories_loading);
}

#[tokio::test]
async fn database_and_repository_refreshes_are_independent() {
    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    *backend.active_database.lock().await = Some("kb".to_string());
    *backend.fail_repositories.lock().await = true;

    let (store, _rx) = store_for(&url);
    tokio::join!(store.refresh_database(), store.refresh_repositories());

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.active_database.as_deref(), Some("kb"));
    assert_eq!(snapshot.active_repositories, None);
    assert!(!snapshot.database_loading);
    assert!(!snapshot.repositories_loading);
}

#[tokio::test]
async fn repeated_refreshes_apply_in_completion_order() {
    // Known limitation: overlapping refreshes are not sequenced, so the
    // last completion wins even if it carries the older request's answer.
    // This pins the simpler observable half of that contract: each
    // completed refresh overwrites the previous view.
    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    let (store, _rx) = store_for(&url);

    *backend.active_database.lock().await = Some("first".to_string());
    store.refresh_database().await;
    assert_eq!(
        store.snapshot().await.active_database.as_deref(),
        Some("first")
    );

    *backend.active_database.lock().await = Some("second".to_string());
    store.refresh_database().await;
    assert_eq!(
        store.snapshot().await.active_database.as_deref(),
        Some("second")
    );
}

#[tokio::test]
async fn refresh_emits_update_events() {
    let (url, backend) = spawn_status_backend().await.expect("spawn backend");
    *backend.active_database.lock().await = Some("kb".to_string());

    let (store, mut rx) = store_for(&url);
    store.refresh_database().await;

    match rx.recv().await.expect("event") {
        ConsoleEvent::ActiveDatabaseUpdated { active_database } => {
            assert_eq!(active_database.as_deref(), Some("kb"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
