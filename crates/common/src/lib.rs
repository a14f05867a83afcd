//! Shared building blocks for the catalog workspace: logging setup,
//! Prometheus metrics and small wire types used by more than one crate.

pub mod metrics;
pub mod types;
pub mod utils;
