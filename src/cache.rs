use serde_json::Value;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

/// Request-keyed cache for GET responses. Keys are request paths.
#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((value, stored)) if stored.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: &str, value: Value) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), (value, Instant::now()));
    }

    /// Drops every entry whose key contains `pattern`. Returns how many went.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        before - entries.len()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
