//! Catalog fetching and caching.

pub mod cache;
pub mod catalog;

pub use catalog::{CacheStatus, CachedPayload, CatalogClient, CatalogClientError};
