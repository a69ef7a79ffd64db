use crate::api::{ListQuery, Page};
use crate::models::Collection;
use crate::submission::FormEvent;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// A cached list page
struct CachedPage {
    page: Page<Value>,
    fetched_at: DateTime<Utc>,
}

/// In-memory store of fetched list pages, keyed by collection and query.
pub struct ListCache {
    ttl_secs: i64,
    pages: Mutex<HashMap<(Collection, ListQuery), CachedPage>>,
}

impl ListCache {
    pub fn new(ttl_secs: i64) -> Self {
        ListCache {
            ttl_secs,
            pages: Mutex::new(HashMap::new()),
        }
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<(Collection, ListQuery), CachedPage>> {
        self.pages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gets a page from the cache
    ///
    /// Returns None if the page was never fetched or is older than the TTL.
    /// Expired pages are dropped on the way out.
    pub fn get(&self, collection: Collection, query: &ListQuery) -> Option<Page<Value>> {
        let key = (collection, query.clone());
        let mut pages = self.pages();
        let fresh = pages
            .get(&key)
            .map(|cached| (Utc::now() - cached.fetched_at).num_seconds() < self.ttl_secs)?;

        if !fresh {
            tracing::debug!("List cache entry for {} page {} expired", collection, query.page);
            pages.remove(&key);
            return None;
        }
        pages.get(&key).map(|cached| cached.page.clone())
    }

    pub fn insert(&self, collection: Collection, query: ListQuery, page: Page<Value>) {
        self.insert_at(collection, query, page, Utc::now());
    }

    fn insert_at(
        &self,
        collection: Collection,
        query: ListQuery,
        page: Page<Value>,
        fetched_at: DateTime<Utc>,
    ) {
        self.pages()
            .insert((collection, query), CachedPage { page, fetched_at });
    }

    /// Drops every cached page of `collection` and returns how many were dropped.
    pub fn invalidate(&self, collection: Collection) -> usize {
        let mut pages = self.pages();
        let before = pages.len();
        pages.retain(|(cached, _), _| *cached != collection);
        let dropped = before - pages.len();
        tracing::debug!("Invalidated {} cached {} pages", dropped, collection);
        dropped
    }

    pub fn clear(&self) {
        self.pages().clear();
    }

    pub fn len(&self) -> usize {
        self.pages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps `cache` in step with writes announced on the form event channel.
///
/// The task ends when every sender is dropped.
pub fn spawn_invalidation(
    cache: Arc<ListCache>,
    mut events: broadcast::Receiver<FormEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(FormEvent::CollectionChanged(collection)) => {
                    cache.invalidate(collection);
                }
                Ok(FormEvent::Navigate(_)) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!("List cache missed {} form events, clearing", missed);
                    cache.clear();
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn page(ids: &[&str]) -> Page<Value> {
        Page {
            items: ids.iter().map(|id| json!({"id": id})).collect(),
            total: ids.len() as u64,
            pages: 1,
            current_page: 1,
            page_size: Some(10),
        }
    }

    #[test]
    fn test_get_returns_fresh_page() {
        let cache = ListCache::new(60);
        let query = ListQuery::first_page(10);
        cache.insert(Collection::Blogs, query.clone(), page(&["b1"]));

        assert_eq!(cache.get(Collection::Blogs, &query), Some(page(&["b1"])));
        assert_eq!(cache.get(Collection::Itineraries, &query), None);
    }

    #[test]
    fn test_expired_page_is_dropped() {
        let cache = ListCache::new(60);
        let query = ListQuery::first_page(10);
        cache.insert_at(
            Collection::Blogs,
            query.clone(),
            page(&["b1"]),
            Utc::now() - Duration::minutes(5),
        );

        assert_eq!(cache.get(Collection::Blogs, &query), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_queries_are_cached_separately() {
        let cache = ListCache::new(60);
        let first = ListQuery::first_page(10);
        let second = ListQuery {
            page: 2,
            ..first.clone()
        };
        cache.insert(Collection::Blogs, first.clone(), page(&["b1"]));
        cache.insert(Collection::Blogs, second.clone(), page(&["b2"]));

        assert_eq!(cache.get(Collection::Blogs, &second), Some(page(&["b2"])));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalidate_only_touches_one_collection() {
        let cache = ListCache::new(60);
        let query = ListQuery::first_page(10);
        cache.insert(Collection::Blogs, query.clone(), page(&["b1"]));
        cache.insert(Collection::Itineraries, query.clone(), page(&["i1"]));

        assert_eq!(cache.invalidate(Collection::Blogs), 1);
        assert_eq!(cache.get(Collection::Blogs, &query), None);
        assert!(cache.get(Collection::Itineraries, &query).is_some());
    }

    #[tokio::test]
    async fn test_collection_changed_event_invalidates() {
        let cache = Arc::new(ListCache::new(60));
        let query = ListQuery::first_page(10);
        cache.insert(Collection::Itineraries, query.clone(), page(&["i1"]));
        cache.insert(Collection::Blogs, query.clone(), page(&["b1"]));

        let (tx, rx) = broadcast::channel(8);
        let handle = spawn_invalidation(cache.clone(), rx);
        tx.send(FormEvent::CollectionChanged(Collection::Itineraries))
            .unwrap();
        tx.send(FormEvent::Navigate("/itineraries".to_string())).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(cache.get(Collection::Itineraries, &query), None);
        assert!(cache.get(Collection::Blogs, &query).is_some());
    }
}
