use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::metrics::{self, OP_DETAIL, OP_LIST, TIER_ENTITY, TIER_PAGE};
use futures::future::try_join_all;
use moka::future::Cache;
use tracing::{debug, info, instrument, warn};

use crate::errors::ServiceError;
use crate::pagination::{page_key, Pagination};
use crate::single_flight::SingleFlight;
use crate::storage::memory_map_store::MemoryMapStore;

use super::model::{Creature, CreaturePatch, NewCreature};
use super::upstream::{CatalogUpstream, UpstreamError};

/// Tunables for `CatalogService`.
#[derive(Clone, Debug)]
pub struct CatalogSettings {
    /// First locally assigned id. Local ids are `>= local_id_base`; upstream ids
    /// are expected to stay below it.
    pub local_id_base: i64,
    /// Deadline applied to every upstream call.
    pub upstream_timeout: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { local_id_base: 1_000_000_000, upstream_timeout: Duration::from_secs(10) }
    }
}

impl CatalogSettings {
    pub fn from_config(cfg: &configs::AppConfig) -> Self {
        Self {
            local_id_base: cfg.catalog.local_id_base,
            upstream_timeout: cfg.upstream.request_timeout(),
        }
    }
}

/// Catalog facade: local create/update/delete over a read-only upstream,
/// with a per-entity cache and a per-page cache.
///
/// Pages are snapshots. Once a `(limit, page)` pair is cached it is served
/// as-is, whatever happens to the entity cache afterwards.
pub struct CatalogService {
    upstream: Arc<dyn CatalogUpstream>,
    entities: MemoryMapStore<i64, Creature>,
    pages: Cache<String, Arc<Vec<Creature>>>,
    entity_flights: SingleFlight<i64, Creature>,
    next_local_id: AtomicI64,
    settings: CatalogSettings,
}

impl CatalogService {
    pub fn new(upstream: Arc<dyn CatalogUpstream>) -> Self {
        Self::with_settings(upstream, CatalogSettings::default())
    }

    pub fn with_settings(upstream: Arc<dyn CatalogUpstream>, settings: CatalogSettings) -> Self {
        Self {
            upstream,
            entities: MemoryMapStore::new(),
            // No capacity and no TTL: pages are never evicted.
            pages: Cache::builder().build(),
            entity_flights: SingleFlight::new(),
            next_local_id: AtomicI64::new(settings.local_id_base),
            settings,
        }
    }

    /// Create a local record. Fails if any cached entity already has the name.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: NewCreature) -> Result<Creature, ServiceError> {
        let result = self
            .entities
            .update_map(|map| {
                if map.values().any(|existing| existing.name == input.name) {
                    return Err(ServiceError::DuplicateName(input.name.clone()));
                }
                let id = self.next_local_id.fetch_add(1, Ordering::Relaxed);
                let creature = input.into_creature(id);
                map.insert(id, creature.clone());
                Ok(creature)
            })
            .await;

        match &result {
            Ok(c) => info!(event = "create", id = c.id, "creature created"),
            Err(e) => warn!(event = "create_rejected", error = %e, "creature not created"),
        }
        result
    }

    /// One page of the upstream listing, served from the page cache after the
    /// first successful population of its key.
    #[instrument(skip(self), fields(key = %pagination.cache_key()))]
    pub async fn find_all(&self, pagination: Pagination) -> Result<Arc<Vec<Creature>>, ServiceError> {
        let key = pagination.cache_key();
        if let Some(page) = self.pages.get(&key).await {
            metrics::record_cache_hit(TIER_PAGE);
            debug!(event = "page_cache_hit", "serving cached page");
            return Ok(page);
        }
        metrics::record_cache_miss(TIER_PAGE);

        // Concurrent misses on the same key share one population; errors are not cached.
        self.pages
            .try_get_with(key, self.populate_page(pagination))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Cached record, or fetched from upstream and cached on first access.
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: i64) -> Result<Creature, ServiceError> {
        if let Some(creature) = self.entities.get(&id).await {
            metrics::record_cache_hit(TIER_ENTITY);
            debug!(event = "entity_cache_hit", "serving cached creature");
            return Ok(creature);
        }
        metrics::record_cache_miss(TIER_ENTITY);

        self.entity_flights
            .run(id, move || async move {
                // A flight that finished after our miss may already have stored it.
                if let Some(creature) = self.entities.get(&id).await {
                    return Ok(creature);
                }
                let fetched = self.resolve(id).await?;
                Ok(self.entities.insert_if_absent(id, fetched).await)
            })
            .await
    }

    /// Merge `patch` onto the current record and store the result.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: i64, patch: CreaturePatch) -> Result<Creature, ServiceError> {
        let current = self.find_one(id).await?;
        let updated = patch.apply(current);
        self.entities.insert(id, updated.clone()).await;
        info!(event = "update", "creature updated");
        Ok(updated)
    }

    /// Drop the record from the entity cache. Cached pages keep their copy.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: i64) -> Result<String, ServiceError> {
        let current = self.find_one(id).await?;
        let removed = self.entities.remove(&id).await.unwrap_or(current);
        info!(event = "remove", name = %removed.name, "creature removed");
        Ok(format!("Creature {} removed", removed.name))
    }

    /// Cached record for `id`, without touching upstream.
    pub async fn cached(&self, id: i64) -> Option<Creature> {
        self.entities.get(&id).await
    }

    pub async fn entity_count(&self) -> usize {
        self.entities.len().await
    }

    /// Cached page for `(limit, page)`, without touching upstream.
    pub async fn cached_page(&self, limit: u32, page: u32) -> Option<Arc<Vec<Creature>>> {
        self.pages.get(&page_key(limit, page)).await
    }

    pub fn page_count(&self) -> usize {
        self.pages.iter().count()
    }

    /// Forget everything cached. Local ids keep increasing.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn reset(&self) {
        self.entities.clear().await;
        self.entity_flights.clear();
        self.pages.invalidate_all();
        self.pages.run_pending_tasks().await;
    }

    async fn populate_page(&self, pagination: Pagination) -> Result<Arc<Vec<Creature>>, ServiceError> {
        let (limit, offset) = (pagination.limit(), pagination.offset());

        metrics::record_upstream_request(OP_LIST);
        let refs = self
            .with_deadline(self.upstream.list_page(limit, offset))
            .await
            .map_err(|e| {
                metrics::record_upstream_error(OP_LIST);
                warn!(event = "upstream_list_failed", limit, offset, error = %e, "upstream listing failed");
                ServiceError::upstream(e)
            })?;

        let ids = refs
            .iter()
            .map(|r| {
                r.id()
                    .ok_or_else(|| ServiceError::upstream(format!("malformed listing url {}", r.url)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // First failure cancels the remaining fetches and fails the page.
        let creatures = try_join_all(ids.into_iter().map(move |id| self.resolve(id))).await?;

        for creature in &creatures {
            self.entities.insert_if_absent(creature.id, creature.clone()).await;
        }
        info!(event = "page_populated", limit, offset, count = creatures.len(), "page cached");
        Ok(Arc::new(creatures))
    }

    /// Fetch and transform one upstream record. Every failure is reported as `NotFound(id)`.
    async fn resolve(&self, id: i64) -> Result<Creature, ServiceError> {
        metrics::record_upstream_request(OP_DETAIL);
        match self.with_deadline(self.upstream.fetch_detail(id)).await {
            Ok(detail) => {
                info!(event = "upstream_fetch", id, "fetched creature from upstream");
                Ok(Creature::from(detail))
            }
            Err(UpstreamError::NotFound) => {
                debug!(event = "upstream_not_found", id, "upstream has no such creature");
                Err(ServiceError::NotFound(id))
            }
            Err(e) => {
                metrics::record_upstream_error(OP_DETAIL);
                warn!(event = "upstream_fetch_failed", id, error = %e, "upstream detail fetch failed");
                Err(ServiceError::NotFound(id))
            }
        }
    }

    async fn with_deadline<T, F>(&self, call: F) -> Result<T, UpstreamError>
    where
        F: Future<Output = Result<T, UpstreamError>>,
    {
        tokio::time::timeout(self.settings.upstream_timeout, call)
            .await
            .unwrap_or(Err(UpstreamError::Timeout))
    }
}
