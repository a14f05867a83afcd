//! Creature catalog: domain model, upstream seam and the caching service.

pub mod http_upstream;
pub mod model;
pub mod service;
pub mod upstream;

pub use http_upstream::HttpCatalogUpstream;
pub use model::{Creature, CreaturePatch, NewCreature};
pub use service::{CatalogService, CatalogSettings};
pub use upstream::{CatalogUpstream, UpstreamError};
