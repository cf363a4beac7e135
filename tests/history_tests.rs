// tests/history_tests.rs

use neurometric::{
    config::{Config, HISTORY_KEY},
    routes,
    state::AppState,
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_dir: PathBuf::from("logs"),
        probe_timeout: Duration::from_millis(100),
        geo_probes: Vec::new(),
        language_detection: false,
        question_bank_path: None,
        cors_origins: Vec::new(),
    }
}

async fn open_pool(database_url: &str) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await
        .expect("Failed to open SQLite file");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

fn database_url(dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("history.db").display())
}

/// Starts the app on a pool over the given database and returns its base URL.
async fn spawn_app(database_url: &str) -> String {
    let pool = open_pool(database_url).await;
    let state = AppState::initialize(test_config(database_url), pool)
        .await
        .expect("Failed to initialize state");
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn history(client: &reqwest::Client, address: &str) -> Vec<i64> {
    let body: serde_json::Value = client
        .get(format!("{}/api/history", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    body["seen_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn history_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(dir.path());
    let client = reqwest::Client::new();

    let first = spawn_app(&url).await;
    let response = client
        .get(format!("{}/api/test?lang=en", first))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let before = history(&client, &first).await;
    assert_eq!(before.len(), 10);
    assert!(before.iter().all(|id| (1..=15).contains(id)));

    // A second instance over the same file sees the same history.
    let second = spawn_app(&url).await;
    assert_eq!(history(&client, &second).await, before);
}

#[tokio::test]
async fn stored_history_is_a_json_array_under_the_fixed_key() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(dir.path());
    let client = reqwest::Client::new();

    let address = spawn_app(&url).await;
    client
        .get(format!("{}/api/test?lang=zh", address))
        .send()
        .await
        .unwrap();

    let pool = open_pool(&url).await;
    let raw: String = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
        .bind(HISTORY_KEY)
        .fetch_one(&pool)
        .await
        .unwrap();
    let ids: Vec<i64> = serde_json::from_str(&raw).unwrap();
    assert_eq!(ids.len(), 10);
    assert!(ids.iter().all(|id| (101..=115).contains(id)));
}

#[tokio::test]
async fn corrupt_history_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(dir.path());
    let client = reqwest::Client::new();

    let pool = open_pool(&url).await;
    sqlx::query("INSERT INTO kv_store (key, value) VALUES (?, ?)")
        .bind(HISTORY_KEY)
        .bind("[1, 2, \"three\"")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let address = spawn_app(&url).await;
    assert!(history(&client, &address).await.is_empty());

    let response = client
        .get(format!("{}/api/test", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(history(&client, &address).await.len(), 10);
}
