#![cfg(test)]
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::upstream::{
    CatalogUpstream, CategorySlot, ImageSet, ListedRef, NamedRef, Statistic, UpstreamCreature,
    UpstreamError,
};

/// In-process upstream seeded with ids `1..=n` that counts every call.
///
/// Record `i` is named `creature-{i}`, has kind `kind-{i}` and vitality `10 * i`.
pub struct FakeUpstream {
    records: BTreeMap<i64, UpstreamCreature>,
    failing: HashSet<i64>,
    delay: Duration,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn seeded(n: i64) -> Self {
        let records = (1..=n).map(|id| (id, record(id))).collect();
        Self {
            records,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            list_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every response, so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make detail fetches for `id` fail with a transport error.
    pub fn failing(mut self, id: i64) -> Self {
        self.failing.insert(id);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

fn record(id: i64) -> UpstreamCreature {
    UpstreamCreature {
        id,
        name: format!("creature-{id}"),
        categories: vec![CategorySlot { category: NamedRef { name: format!("kind-{id}") } }],
        statistics: vec![Statistic { base_value: u32::try_from(id * 10).unwrap_or(0) }],
        images: ImageSet {
            front: Some(format!("https://img.test/{id}.png")),
            back: Some(format!("https://img.test/back/{id}.png")),
        },
    }
}

#[async_trait]
impl CatalogUpstream for FakeUpstream {
    async fn list_page(&self, limit: u32, offset: u64) -> Result<Vec<ListedRef>, UpstreamError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        Ok(self
            .records
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(|r| ListedRef {
                name: r.name.clone(),
                url: format!("https://upstream.test/api/v2/pokemon/{}/", r.id),
            })
            .collect())
    }

    async fn fetch_detail(&self, id: i64) -> Result<UpstreamCreature, UpstreamError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.failing.contains(&id) {
            return Err(UpstreamError::Transport("connection reset".into()));
        }
        self.records.get(&id).cloned().ok_or(UpstreamError::NotFound)
    }
}
