//! Cache-aside resolution of consent type slugs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use consentd_core::{ConsentTypeRecord, Result, Slug};
use consentd_store::{ConsentCache, TypeStore};

use crate::cache::consent_type_key;

/// Resolves a set of slugs to canonical consent type records, consulting
/// the cache first and falling back to the type store, populating the
/// cache on miss.
///
/// Slugs with no matching record are simply absent from the result; the
/// caller decides what "absent" means. A store failure fails the whole
/// resolution; nothing is retried here.
pub struct TypeResolver {
    types: Arc<dyn TypeStore>,
    cache: Arc<dyn ConsentCache>,
    ttl: Duration,
}

impl TypeResolver {
    /// Creates a resolver that caches fetched records for `ttl`.
    pub fn new(types: Arc<dyn TypeStore>, cache: Arc<dyn ConsentCache>, ttl: Duration) -> Self {
        Self { types, cache, ttl }
    }

    /// Resolves the given slugs. Input duplicates are collapsed; the result
    /// maps each known slug to its record.
    pub async fn resolve(&self, slugs: &[Slug]) -> Result<HashMap<Slug, ConsentTypeRecord>> {
        let mut unique: Vec<Slug> = Vec::new();
        for slug in slugs {
            if !unique.contains(slug) {
                unique.push(slug.clone());
            }
        }

        let mut resolved = HashMap::new();
        let mut misses: Vec<Slug> = Vec::new();

        for slug in unique {
            match self.cache.get(&consent_type_key(&slug)).await? {
                Some(value) => match serde_json::from_value::<ConsentTypeRecord>(value) {
                    Ok(record) => {
                        resolved.insert(slug, record);
                    },
                    Err(err) => {
                        // An undecodable entry is treated as a miss; the
                        // store fetch below overwrites it.
                        debug!(slug = %slug, error = %err, "discarding corrupt cache entry");
                        misses.push(slug);
                    },
                },
                None => misses.push(slug),
            }
        }

        if !misses.is_empty() {
            let rows = self.types.find_by_slugs(&misses).await?;
            for record in rows {
                let value = serde_json::to_value(&record)
                    .map_err(|e| consentd_core::ConsentError::internal(e.to_string()))?;
                self.cache
                    .set(&consent_type_key(&record.slug), value, self.ttl)
                    .await?;
                resolved.insert(record.slug.clone(), record);
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use consentd_store::{MemoryStore, StoreError, TypeStore};

    use crate::cache::{CacheSettings, MokaCache};

    /// TypeStore wrapper that counts `find_by_slugs` calls.
    struct CountingTypes {
        inner: Arc<MemoryStore>,
        fetches: AtomicU32,
    }

    #[async_trait]
    impl TypeStore for CountingTypes {
        async fn find_by_slugs(
            &self,
            slugs: &[Slug],
        ) -> std::result::Result<Vec<ConsentTypeRecord>, StoreError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_slugs(slugs).await
        }

        async fn upsert(
            &self,
            slug: Slug,
            name: Option<&str>,
        ) -> std::result::Result<ConsentTypeRecord, StoreError> {
            self.inner.upsert(slug, name).await
        }
    }

    async fn fixture() -> (Arc<CountingTypes>, TypeResolver) {
        let store = Arc::new(MemoryStore::new());
        store.upsert(Slug::new("email_notifications"), None).await.unwrap();
        store.upsert(Slug::new("sms_notifications"), None).await.unwrap();

        let types = Arc::new(CountingTypes {
            inner: store,
            fetches: AtomicU32::new(0),
        });
        let cache = Arc::new(MokaCache::new(CacheSettings::default()));
        let resolver = TypeResolver::new(types.clone(), cache, Duration::from_secs(3600));
        (types, resolver)
    }

    #[tokio::test]
    async fn resolves_known_slugs() {
        let (_, resolver) = fixture().await;

        let result = resolver
            .resolve(&[Slug::new("email_notifications"), Slug::new("sms_notifications")])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.contains_key(&Slug::new("email_notifications")));
    }

    #[tokio::test]
    async fn unknown_slugs_are_absent_from_result() {
        let (_, resolver) = fixture().await;

        let result = resolver
            .resolve(&[Slug::new("email_notifications"), Slug::new("push_notifications")])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert!(!result.contains_key(&Slug::new("push_notifications")));
    }

    #[tokio::test]
    async fn second_resolution_is_served_from_cache() {
        let (types, resolver) = fixture().await;

        resolver.resolve(&[Slug::new("email_notifications")]).await.unwrap();
        resolver.resolve(&[Slug::new("email_notifications")]).await.unwrap();

        assert_eq!(types.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_input_slugs_are_collapsed() {
        let (types, resolver) = fixture().await;

        let result = resolver
            .resolve(&[
                Slug::new("email_notifications"),
                Slug::new("email_notifications"),
            ])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(types.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fully_unknown_set_still_queries_store_once() {
        let (types, resolver) = fixture().await;

        let result = resolver.resolve(&[Slug::new("ghost")]).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(types.fetches.load(Ordering::SeqCst), 1);

        // Unknown slugs are never negatively cached; they hit the store again.
        resolver.resolve(&[Slug::new("ghost")]).await.unwrap();
        assert_eq!(types.fetches.load(Ordering::SeqCst), 2);
    }
}
