//! Storage backends used by the catalog caches.

pub mod memory_map_store;
