use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::Creature;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("not found")]
    NotFound,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(String),
    #[error("parse error: {0}")]
    Decode(String),
    #[error("timed out")]
    Timeout,
}

/// Read-only source of catalog records.
#[async_trait]
pub trait CatalogUpstream: Send + Sync {
    /// References to `limit` records starting at `offset`.
    async fn list_page(&self, limit: u32, offset: u64) -> Result<Vec<ListedRef>, UpstreamError>;

    /// Full record for `id`, or `UpstreamError::NotFound`.
    async fn fetch_detail(&self, id: i64) -> Result<UpstreamCreature, UpstreamError>;
}

/// Listing envelope returned by the upstream list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<ListedRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedRef {
    pub name: String,
    pub url: String,
}

impl ListedRef {
    /// The id is the second-to-last path segment: `.../pokemon/4/` -> `4`.
    pub fn id(&self) -> Option<i64> {
        self.url.split('/').nth_back(1)?.parse().ok()
    }
}

/// Detail payload as served upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamCreature {
    pub id: i64,
    pub name: String,
    #[serde(rename = "types", default)]
    pub categories: Vec<CategorySlot>,
    #[serde(rename = "stats", default)]
    pub statistics: Vec<Statistic>,
    #[serde(rename = "sprites", default)]
    pub images: ImageSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySlot {
    #[serde(rename = "type")]
    pub category: NamedRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistic {
    #[serde(rename = "base_stat")]
    pub base_value: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(rename = "front_default", default)]
    pub front: Option<String>,
    #[serde(rename = "back_default", default)]
    pub back: Option<String>,
}

impl From<UpstreamCreature> for Creature {
    fn from(src: UpstreamCreature) -> Self {
        let kind = src
            .categories
            .into_iter()
            .next()
            .map(|slot| slot.category.name)
            .unwrap_or_default();
        let vitality = src.statistics.first().map(|s| s.base_value).unwrap_or(0);
        Creature {
            id: src.id,
            name: src.name,
            kind,
            vitality,
            images: vec![
                src.images.front.unwrap_or_default(),
                src.images.back.unwrap_or_default(),
            ],
        }
    }
}
