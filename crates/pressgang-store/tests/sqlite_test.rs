//! Integration tests for SqliteStore on an in-memory database.

use chrono::{Duration, Utc};
use pressgang_store::{Error, LogLevel, SqliteStore, Store};
use serde_json::json;

async fn store() -> SqliteStore {
  SqliteStore::in_memory()
    .await
    .expect("failed to open in-memory store")
}

#[tokio::test]
async fn test_create_and_get_event() {
  let store = store().await;
  let now = Utc::now();

  let created = store
    .create_event(7, &json!({"success": true, "post_id": "12"}), now)
    .await
    .unwrap();

  let fetched = store.get_event(created.id).await.unwrap();

  assert_eq!(fetched.agent_id, 7);
  assert_eq!(fetched.payload.0["post_id"], "12");
  assert_eq!(fetched.created_at.timestamp(), now.timestamp());
}

#[tokio::test]
async fn test_missing_event() {
  let store = store().await;

  let err = store.get_event(999).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_latest_event_is_newest_insert() {
  let store = store().await;
  let now = Utc::now();

  store
    .create_event(1, &json!({"success": true}), now - Duration::days(2))
    .await
    .unwrap();
  store
    .create_event(1, &json!({"success": false}), now - Duration::days(1))
    .await
    .unwrap();
  store
    .create_event(2, &json!({"success": true}), now)
    .await
    .unwrap();

  let latest = store.latest_event(1).await.unwrap().unwrap();
  assert_eq!(latest.payload.0["success"], false);

  assert!(store.latest_event(3).await.unwrap().is_none());
  assert_eq!(store.list_events(1).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_latest_error_log_ignores_other_levels() {
  let store = store().await;
  let now = Utc::now();

  store
    .create_log(1, LogLevel::Error, "wp.newPost failed", now - Duration::hours(1))
    .await
    .unwrap();
  store
    .create_log(1, LogLevel::Info, "published", now)
    .await
    .unwrap();

  let log = store.latest_error_log(1).await.unwrap().unwrap();
  assert_eq!(log.level, LogLevel::Error);
  assert_eq!(log.message, "wp.newPost failed");

  assert!(store.latest_error_log(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_recent_error_logs() {
  let store = store().await;
  let now = Utc::now();

  assert!(!store.recent_error_logs(1).await.unwrap());

  store
    .create_event(1, &json!({"success": true}), now - Duration::hours(1))
    .await
    .unwrap();
  store
    .create_log(1, LogLevel::Error, "old failure", now - Duration::hours(3))
    .await
    .unwrap();
  assert!(!store.recent_error_logs(1).await.unwrap());

  store
    .create_log(1, LogLevel::Error, "new failure", now)
    .await
    .unwrap();
  assert!(store.recent_error_logs(1).await.unwrap());
}
