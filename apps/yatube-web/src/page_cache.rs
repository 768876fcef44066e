//! Time-bounded cache of the rendered home page.
//!
//! Entries live under the `index_page` prefix, one per resolved page
//! number, and are never invalidated by writes; they expire or get cleared.

use std::sync::Arc;
use std::time::Duration;

use yatube_core::ports::Cache;
use yatube_shared::RenderedPage;

pub const INDEX_PAGE_PREFIX: &str = "index_page";

#[derive(Clone)]
pub struct HomePageCache {
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

/// Callers pass page numbers already clamped to the listing, so the key
/// space is bounded by the page count.
fn page_key(number: u64) -> String {
    format!("{INDEX_PAGE_PREFIX}:{number}")
}

impl HomePageCache {
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub async fn get(&self, number: u64) -> Option<RenderedPage> {
        let key = page_key(number);
        let raw = self.cache.get(&key).await?;
        match serde_json::from_str(&raw) {
            Ok(page) => {
                tracing::debug!(key = %key, "Home page served from cache");
                Some(page)
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cached page");
                None
            }
        }
    }

    /// Store a rendered page. Cache failures only cost a re-render, so they are logged.
    pub async fn store(&self, number: u64, page: &RenderedPage) {
        let key = page_key(number);
        let raw = match serde_json::to_string(page) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not serialize page for caching");
                return;
            }
        };
        if let Err(e) = self.cache.set(&key, &raw, Some(self.ttl)).await {
            tracing::warn!(key = %key, error = %e, "Could not cache home page");
        }
    }

    /// Drop every cached home page.
    pub async fn clear(&self) {
        if let Err(e) = self.cache.delete_prefix(INDEX_PAGE_PREFIX).await {
            tracing::warn!(error = %e, "Could not clear home page cache");
        }
    }
}
