// src/services/history.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::error::AppError;

/// Bank ids of every question already shown on this device.
pub type SeenIdSet = BTreeSet<i64>;

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// `KeyValueStore` backed by the `kv_store` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value)
            VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Tracks which questions have been shown, persisted under a fixed key.
///
/// Persistence is best-effort: read failures and corrupt data load as an
/// empty set, write failures are logged and dropped. Ids are never removed
/// except by an explicit `reset`.
pub struct HistoryTracker {
    store: Arc<dyn KeyValueStore>,
    key: String,
    seen: SeenIdSet,
}

impl HistoryTracker {
    /// Creates a tracker and loads whatever history is already stored.
    pub async fn open(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let mut tracker = Self {
            store,
            key: key.into(),
            seen: SeenIdSet::new(),
        };
        tracker.seen = tracker.load().await;
        tracker
    }

    /// Reads the persisted set. Never fails.
    pub async fn load(&self) -> SeenIdSet {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return SeenIdSet::new(),
            Err(e) => {
                tracing::warn!("Failed to read seen question history: {}", e);
                return SeenIdSet::new();
            }
        };

        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!("Ignoring malformed seen question history: {}", e);
                SeenIdSet::new()
            }
        }
    }

    /// Persists `seen` in full. Failures are swallowed.
    pub async fn save(&self, seen: &SeenIdSet) {
        let ids: Vec<i64> = seen.iter().copied().collect();
        let raw = match serde_json::to_string(&ids) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to encode seen question history: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &raw).await {
            tracing::warn!("Seen question history not persisted: {}", e);
        }
    }

    pub async fn mark_seen<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        self.seen.extend(ids);
        self.save(&self.seen).await;
    }

    /// Forgets every seen id and persists the empty set.
    pub async fn reset(&mut self) {
        self.seen.clear();
        self.save(&self.seen).await;
    }

    pub fn seen(&self) -> &SeenIdSet {
        &self.seen
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store; optionally rejects every write.
    #[derive(Default)]
    pub(crate) struct MemoryStore {
        entries: Mutex<HashMap<String, String>>,
        reject_writes: bool,
    }

    impl MemoryStore {
        pub(crate) fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::default();
            store
                .entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            store
        }

        pub(crate) fn read_only() -> Self {
            Self {
                reject_writes: true,
                ..Self::default()
            }
        }

        pub(crate) fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStore for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
            if self.reject_writes {
                return Err(AppError::Storage("quota exceeded".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    struct UnavailableStore;

    #[async_trait]
    impl KeyValueStore for UnavailableStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, AppError> {
            Err(AppError::Storage("storage unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), AppError> {
            Err(AppError::Storage("storage unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn missing_history_loads_empty() {
        let tracker = HistoryTracker::open(Arc::new(MemoryStore::default()), "seen").await;
        assert!(tracker.seen().is_empty());
    }

    #[tokio::test]
    async fn malformed_history_loads_empty() {
        let store = MemoryStore::with_entry("seen", "{not json");
        let tracker = HistoryTracker::open(Arc::new(store), "seen").await;
        assert!(tracker.seen().is_empty());
    }

    #[tokio::test]
    async fn unavailable_storage_loads_empty_and_keeps_working() {
        let mut tracker = HistoryTracker::open(Arc::new(UnavailableStore), "seen").await;
        tracker.mark_seen([1, 2]).await;
        assert_eq!(tracker.seen(), &SeenIdSet::from([1, 2]));
    }

    #[tokio::test]
    async fn rejected_write_is_swallowed() {
        let mut tracker = HistoryTracker::open(Arc::new(MemoryStore::read_only()), "seen").await;
        tracker.mark_seen([4]).await;
        assert!(tracker.seen().contains(&4));
    }

    #[tokio::test]
    async fn mark_seen_round_trips_through_a_fresh_load() {
        let store = Arc::new(MemoryStore::with_entry("seen", "[1]"));
        let mut tracker = HistoryTracker::open(store.clone(), "seen").await;
        tracker.mark_seen([5, 7, 9]).await;

        let reopened = HistoryTracker::open(store.clone(), "seen").await;
        assert_eq!(reopened.seen(), &SeenIdSet::from([1, 5, 7, 9]));
        assert_eq!(store.raw("seen").as_deref(), Some("[1,5,7,9]"));
    }

    #[tokio::test]
    async fn mark_seen_never_drops_ids() {
        let store = Arc::new(MemoryStore::default());
        let mut tracker = HistoryTracker::open(store, "seen").await;
        tracker.mark_seen([3, 1]).await;
        tracker.mark_seen([1, 2]).await;
        assert_eq!(tracker.seen(), &SeenIdSet::from([1, 2, 3]));
    }

    #[tokio::test]
    async fn reset_persists_an_empty_set() {
        let store = Arc::new(MemoryStore::with_entry("seen", "[1,2,3]"));
        let mut tracker = HistoryTracker::open(store.clone(), "seen").await;
        tracker.reset().await;

        assert!(tracker.seen().is_empty());
        assert_eq!(store.raw("seen").as_deref(), Some("[]"));
    }
}
