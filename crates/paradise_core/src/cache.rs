//! In-memory store of successful query results.

use std::collections::{HashMap, VecDeque};

use serde_json::Value;
use tokio::sync::RwLock;

use crate::entities::GraphqlRequest;

#[derive(Default)]
struct Entries {
    values: HashMap<String, Value>,
    insertion_order: VecDeque<String>,
}

/// Query results keyed by document shape and variables.
///
/// Bounded: once `max_entries` is reached the oldest entry is evicted.
/// Nothing here invalidates entries after a mutation; callers re-issue their
/// query with a network policy when they need fresh data.
pub struct QueryCache {
    entries: RwLock<Entries>,
    max_entries: usize,
}

impl QueryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_entries,
        }
    }

    /// Whitespace in the document is not significant; variables are compared
    /// by their canonical JSON text.
    pub fn key(request: &GraphqlRequest) -> String {
        let shape = request.query.split_whitespace().collect::<Vec<_>>().join(" ");
        format!("{}|{}", shape, request.variables)
    }

    pub async fn get(&self, request: &GraphqlRequest) -> Option<Value> {
        self.entries
            .read()
            .await
            .values
            .get(&Self::key(request))
            .cloned()
    }

    pub async fn put(&self, request: &GraphqlRequest, data: Value) {
        if self.max_entries == 0 {
            return;
        }

        let key = Self::key(request);
        let mut entries = self.entries.write().await;

        if entries.values.insert(key.clone(), data).is_none() {
            entries.insertion_order.push_back(key);
        }

        while entries.values.len() > self.max_entries {
            match entries.insertion_order.pop_front() {
                Some(oldest) => {
                    entries.values.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub async fn evict(&self, request: &GraphqlRequest) {
        let key = Self::key(request);
        let mut entries = self.entries.write().await;
        if entries.values.remove(&key).is_some() {
            entries.insertion_order.retain(|k| k != &key);
        }
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.values.clear();
        entries.insertion_order.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tours(page: u32) -> GraphqlRequest {
        GraphqlRequest::new("query getAllTours($page: Int) { getAllTours(page: $page) { data { uuid } } }")
            .with_variables(json!({ "page": page }))
    }

    #[tokio::test]
    async fn test_key_ignores_whitespace_but_not_variables() {
        let compact = GraphqlRequest::new("query Me { me { uuid } }");
        let spread = GraphqlRequest::new("query Me {\n  me {\n    uuid\n  }\n}\n");

        assert_eq!(QueryCache::key(&compact), QueryCache::key(&spread));
        assert_ne!(QueryCache::key(&tours(1)), QueryCache::key(&tours(2)));
    }

    #[tokio::test]
    async fn test_put_get_evict() {
        let cache = QueryCache::new(10);
        assert!(cache.get(&tours(1)).await.is_none());

        cache.put(&tours(1), json!({ "page": 1 })).await;
        assert_eq!(cache.get(&tours(1)).await, Some(json!({ "page": 1 })));

        cache.put(&tours(1), json!({ "page": "updated" })).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&tours(1)).await, Some(json!({ "page": "updated" })));

        cache.evict(&tours(1)).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_oldest_entry_evicted_at_capacity() {
        let cache = QueryCache::new(2);

        cache.put(&tours(1), json!(1)).await;
        cache.put(&tours(2), json!(2)).await;
        cache.put(&tours(3), json!(3)).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.get(&tours(1)).await.is_none());
        assert_eq!(cache.get(&tours(3)).await, Some(json!(3)));
    }

    #[tokio::test]
    async fn test_zero_capacity_disables_cache() {
        let cache = QueryCache::new(0);
        cache.put(&tours(1), json!(1)).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = QueryCache::new(5);
        cache.put(&tours(1), json!(1)).await;
        cache.put(&tours(2), json!(2)).await;

        cache.clear().await;

        assert!(cache.is_empty().await);
    }
}
