use super::AppContext;
use crate::api::{ListQuery, Page};
use crate::error::Result;
use crate::models::Collection;
use crate::submission::FormEvent;
use serde_json::Value;

/// Lists one page of a collection, served from the cache while fresh.
pub async fn list_page(
    ctx: &AppContext,
    collection: Collection,
    query: &ListQuery,
) -> Result<Page<Value>> {
    if let Some(page) = ctx.cache.get(collection, query) {
        tracing::debug!("List cache hit for {} page {}", collection, query.page);
        return Ok(page);
    }

    let page = ctx.api.list(collection, query).await?;
    ctx.cache.insert(collection, query.clone(), page.clone());
    Ok(page)
}

/// Lists the newest entries using the configured page size.
pub async fn first_page(ctx: &AppContext, collection: Collection) -> Result<Page<Value>> {
    list_page(ctx, collection, &ListQuery::first_page(ctx.config.page_size)).await
}

/// Deletes an entry and announces the change to list listeners.
pub async fn delete_entry(ctx: &AppContext, collection: Collection, id: &str) -> Result<()> {
    ctx.api.delete(collection, id).await?;
    tracing::info!("Deleted {} {}", collection.singular(), id);

    ctx.cache.invalidate(collection);
    if ctx.events.send(FormEvent::CollectionChanged(collection)).is_err() {
        tracing::debug!("No listeners for form events");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testing::{MockContentApi, MockGateway};
    use crate::DashboardError;
    use serde_json::json;
    use std::sync::Arc;

    fn context(api: Arc<MockContentApi>) -> AppContext {
        AppContext::with_clients(Config::default(), api, Arc::new(MockGateway::new()))
    }

    #[tokio::test]
    async fn test_list_page_reads_through_cache() {
        let api = Arc::new(MockContentApi::new().with_items(vec![json!({"id": "b1"})]));
        let ctx = context(api.clone());

        let first = first_page(&ctx, Collection::Blogs).await.unwrap();
        let second = first_page(&ctx, Collection::Blogs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.page_size, Some(10));
        assert_eq!(api.count("list"), 1);
    }

    #[tokio::test]
    async fn test_delete_refreshes_listing() {
        let api = Arc::new(MockContentApi::new());
        let ctx = context(api.clone());
        let mut events = ctx.subscribe();

        first_page(&ctx, Collection::Itineraries).await.unwrap();
        delete_entry(&ctx, Collection::Itineraries, "i1").await.unwrap();
        first_page(&ctx, Collection::Itineraries).await.unwrap();

        assert_eq!(api.count("list"), 2);
        assert_eq!(
            events.try_recv().unwrap(),
            FormEvent::CollectionChanged(Collection::Itineraries)
        );
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_cache() {
        let api = Arc::new(MockContentApi::new().rejecting(404, Some("Itinerary not found")));
        let ctx = context(api.clone());
        ctx.cache
            .insert(Collection::Itineraries, ListQuery::first_page(10), Page {
                items: vec![],
                total: 0,
                pages: 0,
                current_page: 1,
                page_size: None,
            });

        let err = delete_entry(&ctx, Collection::Itineraries, "i1")
            .await
            .unwrap_err();

        assert!(matches!(err, DashboardError::Api { status: 404, .. }));
        assert_eq!(ctx.cache.len(), 1);
    }
}
