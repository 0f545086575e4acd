//! On-disk snapshot of the last catalog fetch, with TTL.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::domain::CatalogItem;

const CACHE_DIR: &str = "trade-value-scanner";
const CACHE_FILENAME: &str = "catalog_cache.json";

/// Default TTL: 6 hours. Values are re-published a few times a day.
pub const CATALOG_CACHE_TTL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCache {
    /// Unix timestamp (seconds) when this snapshot was taken.
    pub cached_at: u64,
    pub items: Vec<CatalogItem>,
}

impl CatalogCache {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            cached_at: unix_now(),
            items,
        }
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Default location under the platform's local data directory.
pub fn default_cache_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CACHE_DIR)
        .join(CACHE_FILENAME)
}

/// Loads a snapshot regardless of age; callers decide whether it is usable.
pub fn load_catalog_cache(path: &Path) -> Option<CatalogCache> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no catalog cache on disk");
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<CatalogCache>(&content) {
            Ok(cache) => {
                tracing::debug!(
                    items = cache.items.len(),
                    age = %cache.age_string(),
                    "loaded catalog cache"
                );
                Some(cache)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse catalog cache");
                None
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "failed to read catalog cache");
            None
        }
    }
}

pub fn save_catalog_cache(path: &Path, cache: &CatalogCache) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    // compact, the catalog runs to thousands of entries
    let content = serde_json::to_string(cache)?;
    fs::write(path, content)?;
    tracing::debug!(items = cache.items.len(), path = %path.display(), "saved catalog cache");
    Ok(())
}
