//! Cache for the last set of AI recommendations.
//!
//! Recommendations take several seconds to generate on the backend, so the
//! most recent result is kept around and shown again without a round trip.
//! The cache lives in ephemeral storage (a [`MemoryStore`] by default):
//! it is scoped to one running client and is cleared on logout so the next
//! user never sees the previous user's suggestions.

use gameup_protocol::{Codec, JsonCodec, Recommendation};

use crate::{KeyValueStore, MemoryStore, StorageError};

/// The key the cached list is stored under.
pub const RECOMMENDATIONS_KEY: &str = "aiRecommendations";

/// The last recommendations fetched for the signed-in user.
#[derive(Debug)]
pub struct RecommendationCache<S = MemoryStore> {
    storage: S,
    codec: JsonCodec,
}

impl RecommendationCache<MemoryStore> {
    /// An empty cache backed by process memory.
    pub fn new() -> Self {
        Self::with_storage(MemoryStore::new())
    }
}

impl Default for RecommendationCache<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyValueStore> RecommendationCache<S> {
    /// A cache backed by any store.
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            codec: JsonCodec,
        }
    }

    /// Returns the cached list, or an empty one if nothing usable is stored.
    ///
    /// A cached value that no longer decodes is dropped, not reported.
    pub async fn load(&self) -> Vec<Recommendation> {
        let raw = match self.storage.get(RECOMMENDATIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read recommendation cache");
                return Vec::new();
            }
        };

        match self.codec.decode(raw.as_bytes()) {
            Ok(items) => items,
            Err(e) => {
                tracing::debug!(error = %e, "discarding unreadable recommendation cache");
                Vec::new()
            }
        }
    }

    /// Replaces the cached list.
    pub async fn store(&self, items: &[Recommendation]) -> Result<(), StorageError> {
        let bytes = self.codec.encode(&items)?;
        let raw = String::from_utf8_lossy(&bytes);
        self.storage.set(RECOMMENDATIONS_KEY, &raw).await?;
        tracing::debug!(count = items.len(), "recommendations cached");
        Ok(())
    }

    /// Forgets the cached list.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(RECOMMENDATIONS_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use gameup_protocol::{CatalogItemId, CatalogItemSummary};

    use super::*;

    fn rec(id: u64, name: &str) -> Recommendation {
        Recommendation {
            reason: format!("Because you finished something like {name}"),
            details: CatalogItemSummary {
                id: CatalogItemId(id),
                name: name.to_string(),
                cover: None,
                first_release_date: None,
                summary: None,
            },
        }
    }

    #[tokio::test]
    async fn test_load_empty_cache_returns_empty() {
        let cache = RecommendationCache::new();
        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_then_load_returns_same_list() {
        let cache = RecommendationCache::new();
        let items = vec![rec(1, "Hollow Knight"), rec(2, "Celeste")];

        cache.store(&items).await.unwrap();

        assert_eq!(cache.load().await, items);
    }

    #[tokio::test]
    async fn test_clear_empties_cache() {
        let cache = RecommendationCache::new();
        cache.store(&[rec(1, "Hades")]).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_value_returns_empty() {
        let storage = std::sync::Arc::new(MemoryStore::new());
        storage.set(RECOMMENDATIONS_KEY, "[{\"reason\":").await.unwrap();
        let cache = RecommendationCache::with_storage(storage);

        assert!(cache.load().await.is_empty());
    }
}
