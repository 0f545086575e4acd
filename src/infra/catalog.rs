//! Thin asynchronous client for the item catalog.
//!
//! - Fetches the full catalog and converts it into [`CatalogItem`]s.
//! - Keeps an in-memory TTL cache with stale fallbacks, backed by an on-disk snapshot.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use reqwest::{Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::{Catalog, CatalogItem, ItemIdentity};
use crate::infra::cache::{
    default_cache_path, load_catalog_cache, save_catalog_cache, CatalogCache, CATALOG_CACHE_TTL,
};

pub const DEFAULT_BASE_URL: &str = "https://api.tradevalues.example/v1/";
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
const USER_AGENT: &str = concat!("trade-value-scanner/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CatalogClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: String,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<Option<Cached<Vec<CatalogItem>>>>>,
    ttl: Duration,
    disk_path: PathBuf,
    disk_ttl: Duration,
}

impl CatalogClient {
    pub fn new() -> Result<Self, CatalogClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, CatalogClientError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_TTL,
            disk_path: default_cache_path(),
            disk_ttl: CATALOG_CACHE_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_disk_cache(mut self, path: PathBuf, ttl: Duration) -> Self {
        self.disk_path = path;
        self.disk_ttl = ttl;
        self
    }

    /// Current catalog snapshot.
    ///
    /// Order of preference: fresh memory cache, unexpired disk snapshot, network,
    /// then any stale copy if the network request fails.
    pub async fn get_catalog(&self) -> Result<CachedPayload<Catalog>, CatalogClientError> {
        if let Some(payload) = self.cached_items().await {
            return Ok(payload.map_catalog());
        }

        let disk = load_catalog_cache(&self.disk_path);
        if let Some(snapshot) = disk.as_ref().filter(|c| !c.is_expired(self.disk_ttl)) {
            tracing::info!(
                items = snapshot.items.len(),
                age = %snapshot.age_string(),
                "using catalog snapshot from disk"
            );
            let fetched_at = UNIX_EPOCH + Duration::from_secs(snapshot.cached_at);
            return Ok(self
                .store_items(snapshot.items.clone(), fetched_at, CacheStatus::Cached)
                .await
                .map_catalog());
        }

        match self.refresh().await {
            Ok(payload) => Ok(payload),
            Err(error) => {
                tracing::warn!(error = %error, "catalog fetch failed");
                if let Some(stale) = self.cached_items_stale().await {
                    return Ok(stale.map_catalog());
                }
                if let Some(snapshot) = disk {
                    tracing::warn!(age = %snapshot.age_string(), "falling back to expired catalog snapshot");
                    let fetched_at = UNIX_EPOCH + Duration::from_secs(snapshot.cached_at);
                    return Ok(CachedPayload::new(snapshot.items, fetched_at, CacheStatus::Stale)
                        .map_catalog());
                }
                Err(error)
            }
        }
    }

    /// Fetches from the network, bypassing caches, and stores the result.
    pub async fn refresh(&self) -> Result<CachedPayload<Catalog>, CatalogClientError> {
        let url = self.url("items")?;
        tracing::info!(%url, "requesting catalog");

        let records: Vec<serde_json::Value> = self.fetch_data(self.http.get(url)).await?;
        let items = parse_items(records);
        tracing::info!(items = items.len(), "catalog fetched");

        if let Err(e) = save_catalog_cache(&self.disk_path, &CatalogCache::new(items.clone())) {
            tracing::warn!(error = %e, "failed to save catalog cache");
        }

        Ok(self
            .store_items(items, SystemTime::now(), CacheStatus::Fresh)
            .await
            .map_catalog())
    }

    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
    }

    async fn cached_items(&self) -> Option<CachedPayload<Vec<CatalogItem>>> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_items_stale(&self) -> Option<CachedPayload<Vec<CatalogItem>>> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store_items(
        &self,
        items: Vec<CatalogItem>,
        fetched_at: SystemTime,
        status: CacheStatus,
    ) -> CachedPayload<Vec<CatalogItem>> {
        let payload = CachedPayload::new(items.clone(), fetched_at, status);
        *self.cache.lock().await = Some(Cached::new(items, fetched_at));
        payload
    }

    async fn fetch_data<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, CatalogClientError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?.error_for_status()?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        unwrap_envelope(envelope)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

impl CachedPayload<Vec<CatalogItem>> {
    fn map_catalog(self) -> CachedPayload<Catalog> {
        CachedPayload::new(Catalog::new(self.data), self.fetched_at, self.status)
    }
}

fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<T, CatalogClientError> {
    let ApiEnvelope {
        status,
        data,
        message,
    } = envelope;

    if status.eq_ignore_ascii_case("ok") {
        data.ok_or_else(|| CatalogClientError::Api("response missing data".into()))
    } else {
        Err(CatalogClientError::Api(message.unwrap_or(status)))
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

/// Converts raw catalog records one at a time. A malformed record is logged and
/// skipped; it never fails the whole fetch.
fn parse_items(records: Vec<serde_json::Value>) -> Vec<CatalogItem> {
    let total = records.len();
    let items: Vec<CatalogItem> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<CatalogItemDto>(record) {
            Ok(dto) => Some(CatalogItem::from(dto)),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping malformed catalog record");
                None
            }
        })
        .collect();
    if items.len() < total {
        tracing::warn!(skipped = total - items.len(), total, "catalog had malformed records");
    }
    items
}

#[derive(Debug, Deserialize)]
struct CatalogItemDto {
    #[serde(deserialize_with = "id_from_json")]
    id: u64,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default, alias = "type")]
    category: Option<String>,
    #[serde(default, alias = "cashValue", deserialize_with = "optional_string_from_json")]
    cash_value: Option<String>,
    #[serde(default, alias = "dupedValue", deserialize_with = "optional_string_from_json")]
    duped_value: Option<String>,
    #[serde(default)]
    demand: Option<String>,
    #[serde(default)]
    trend: Option<String>,
    #[serde(default)]
    limited: Option<bool>,
    #[serde(default)]
    seasonal: Option<bool>,
    #[serde(default)]
    tradable: Option<bool>,
}

impl From<CatalogItemDto> for CatalogItem {
    fn from(dto: CatalogItemDto) -> Self {
        let name = match dto.name.trim() {
            "" => format!("Item {}", dto.id),
            name => name.to_string(),
        };

        Self {
            identity: ItemIdentity::new(dto.id, dto.variant),
            name,
            category: dto.category.unwrap_or_else(|| "Unknown".to_string()),
            cash_value: dto.cash_value,
            duped_value: dto.duped_value,
            demand: dto.demand,
            trend: dto.trend,
            limited: dto.limited.unwrap_or(false),
            seasonal: dto.seasonal.unwrap_or(false),
            tradable: dto.tradable.unwrap_or(true),
        }
    }
}

fn id_from_json<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct NumberOrString;

    impl<'de> serde::de::Visitor<'de> for NumberOrString {
        type Value = u64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a non-negative integer or numeric string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            u64::try_from(value).map_err(|_| E::custom(format!("negative id {value}")))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid id '{value}'")))
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

/// Value fields arrive as `"2.5m"`, `2500000` or `null` depending on who edited them.
fn optional_string_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, number or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value::normalize;

    const BODY: &str = r#"{
        "status": "ok",
        "data": [
            {"id": 12, "name": "Torpedo", "type": "Vehicle", "cash_value": "2.5m",
             "duped_value": "N/A", "demand": "High", "trend": "Stable", "limited": true},
            {"id": "12", "variant": "Gold", "name": "Torpedo", "type": "Vehicle",
             "cashValue": 4000000, "dupedValue": null, "updated_at": "2024-03-01T12:00:00Z"},
            {"id": 40, "variant": "  ", "name": "Crate", "cash_value": 1250.5}
        ]
    }"#;

    #[test]
    fn envelope_items_convert() {
        let envelope: ApiEnvelope<Vec<serde_json::Value>> = serde_json::from_str(BODY).unwrap();
        let items = parse_items(unwrap_envelope(envelope).unwrap());

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].identity, ItemIdentity::base(12));
        assert_eq!(items[0].category, "Vehicle");
        assert!(items[0].limited && items[0].tradable);

        assert_eq!(items[1].identity, ItemIdentity::with_variant(12, "Gold"));
        assert_eq!(items[1].cash_value.as_deref(), Some("4000000"));
        assert_eq!(items[1].duped_value, None);

        assert_eq!(items[2].identity, ItemIdentity::base(40));
        assert_eq!(items[2].category, "Unknown");
        assert_eq!(normalize(items[2].cash_value.as_deref()), 1250.5);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let records: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"id": -3, "name": "Broken", "cash_value": "1m"},
                {"id": 7, "type": "Rim", "cash_value": "950k"},
                {"id": 8, "name": "Torpedo", "cash_value": "2m", "value": "3m"},
                {"name": "No id"},
                {"id": 9, "variant": "BASE", "name": "Crate", "cash_value": "1k"}
            ]"#,
        )
        .unwrap();

        let items = parse_items(records);

        let ids: Vec<_> = items.iter().map(|item| item.identity.clone()).collect();
        assert_eq!(
            ids,
            vec![ItemIdentity::base(7), ItemIdentity::base(8), ItemIdentity::base(9)]
        );
        assert_eq!(items[0].name, "Item 7");
        assert_eq!(items[1].cash_value.as_deref(), Some("2m"));
        assert_eq!(items[2].identity.variant, None);
    }

    #[test]
    fn error_envelope_surfaces_message() {
        let envelope: ApiEnvelope<Vec<CatalogItemDto>> =
            serde_json::from_str(r#"{"status": "error", "message": "rate limited"}"#).unwrap();
        match unwrap_envelope(envelope) {
            Err(CatalogClientError::Api(message)) => assert_eq!(message, "rate limited"),
            other => panic!("unexpected result: {other:?}"),
        }

        let empty: ApiEnvelope<Vec<CatalogItemDto>> =
            serde_json::from_str(r#"{"status": "OK"}"#).unwrap();
        assert!(unwrap_envelope(empty).is_err());
    }

    fn offline_client(dir: &std::path::Path) -> CatalogClient {
        // Nothing listens on the discard port, so any network attempt fails.
        CatalogClient::with_base_url("http://127.0.0.1:9/")
            .unwrap()
            .with_disk_cache(dir.join("catalog.json"), CATALOG_CACHE_TTL)
    }

    #[tokio::test]
    async fn unexpired_disk_snapshot_avoids_network() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = CatalogCache::new(vec![
            CatalogItem::new(ItemIdentity::base(1), "Torpedo", "Vehicle").with_cash_value("1m"),
        ]);
        save_catalog_cache(&dir.path().join("catalog.json"), &snapshot).unwrap();

        let payload = offline_client(dir.path()).get_catalog().await.unwrap();
        assert_eq!(payload.status, CacheStatus::Cached);
        assert_eq!(payload.data.len(), 1);
    }

    #[tokio::test]
    async fn expired_snapshot_is_served_stale_when_fetch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = CatalogCache::new(vec![
            CatalogItem::new(ItemIdentity::base(1), "Torpedo", "Vehicle").with_cash_value("1m"),
        ]);
        snapshot.cached_at = snapshot.cached_at.saturating_sub(CATALOG_CACHE_TTL.as_secs() + 60);
        save_catalog_cache(&dir.path().join("catalog.json"), &snapshot).unwrap();

        let payload = offline_client(dir.path()).get_catalog().await.unwrap();
        assert_eq!(payload.status, CacheStatus::Stale);
        assert!(payload.data.get(&ItemIdentity::base(1)).is_some());
    }

    #[tokio::test]
    async fn no_cache_and_no_network_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(offline_client(dir.path()).get_catalog().await.is_err());
    }
}
