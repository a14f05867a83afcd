//! Service layer for the creature catalog.
//! - `catalog::CatalogService` owns the entity and page caches and mediates
//!   every read and write.
//! - Upstream access goes through the `CatalogUpstream` trait.
//! - Errors are `errors::ServiceError`.

pub mod catalog;
pub mod errors;
pub mod pagination;
pub mod single_flight;
pub mod storage;
#[cfg(test)]
pub mod test_support;
