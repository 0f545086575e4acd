use std::{
    cmp::Ordering,
    collections::HashMap,
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

/// Label used for the grouping key of items without a variant.
pub const BASE_VARIANT: &str = "base";

/// Identifies a catalog entry: numeric item id plus an optional variant label.
///
/// Equality, hashing and ordering go through [`ItemIdentity::grouping_key`], so a
/// variant spelled `"base"` (any case) or left blank is the same identity as no variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemIdentity {
    pub id: u64,
    #[serde(default)]
    pub variant: Option<String>,
}

impl ItemIdentity {
    /// Canonical form: blank and `"base"` variants become `None`.
    pub fn new(id: u64, variant: Option<String>) -> Self {
        let variant = variant
            .map(|v| v.trim().to_string())
            .filter(|v| !is_base_variant(v));
        Self { id, variant }
    }

    pub fn base(id: u64) -> Self {
        Self { id, variant: None }
    }

    pub fn with_variant(id: u64, variant: impl Into<String>) -> Self {
        Self::new(id, Some(variant.into()))
    }

    /// `(id, variant)` with a missing, blank or `"base"` variant collapsed to `"base"`.
    pub fn grouping_key(&self) -> (u64, &str) {
        let variant = match self.variant.as_deref().map(str::trim) {
            Some(v) if !is_base_variant(v) => v,
            _ => BASE_VARIANT,
        };
        (self.id, variant)
    }
}

fn is_base_variant(variant: &str) -> bool {
    let variant = variant.trim();
    variant.is_empty() || variant.eq_ignore_ascii_case(BASE_VARIANT)
}

impl PartialEq for ItemIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.grouping_key() == other.grouping_key()
    }
}

impl Eq for ItemIdentity {}

impl Hash for ItemIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grouping_key().hash(state);
    }
}

impl PartialOrd for ItemIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.grouping_key().cmp(&other.grouping_key())
    }
}

impl fmt::Display for ItemIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.grouping_key() {
            (id, BASE_VARIANT) => write!(f, "{id}"),
            (id, variant) => write!(f, "{id}:{variant}"),
        }
    }
}

/// One tradable item (or named variant) as published by the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub identity: ItemIdentity,
    pub name: String,
    pub category: String,
    /// Human-authored value string such as `"2.5m"`, `"450k"` or `"N/A"`.
    pub cash_value: Option<String>,
    /// Value when the item carries a dupe history. Unknown for many items.
    pub duped_value: Option<String>,
    pub demand: Option<String>,
    pub trend: Option<String>,
    #[serde(default)]
    pub limited: bool,
    #[serde(default)]
    pub seasonal: bool,
    #[serde(default = "default_tradable")]
    pub tradable: bool,
}

fn default_tradable() -> bool {
    true
}

impl CatalogItem {
    pub fn new(identity: ItemIdentity, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            identity,
            name: name.into(),
            category: category.into(),
            cash_value: None,
            duped_value: None,
            demand: None,
            trend: None,
            limited: false,
            seasonal: false,
            tradable: true,
        }
    }

    pub fn with_cash_value(mut self, value: impl Into<String>) -> Self {
        self.cash_value = Some(value.into());
        self
    }

    pub fn with_duped_value(mut self, value: impl Into<String>) -> Self {
        self.duped_value = Some(value.into());
        self
    }

    pub fn with_demand(mut self, demand: impl Into<String>) -> Self {
        self.demand = Some(demand.into());
        self
    }

    /// Name including the variant, e.g. `"Torpedo (Gold)"`.
    pub fn display_name(&self) -> String {
        match self.identity.grouping_key() {
            (_, BASE_VARIANT) => self.name.clone(),
            (_, variant) => format!("{} ({})", self.name, variant),
        }
    }
}

/// Read-only catalog snapshot indexed by identity.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: HashMap<ItemIdentity, usize>,
}

impl Catalog {
    /// Builds the index. Later duplicates of an identity are dropped so the
    /// first record wins.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut index = HashMap::with_capacity(items.len());
        let mut unique = Vec::with_capacity(items.len());
        for item in items {
            if index.contains_key(&item.identity) {
                continue;
            }
            index.insert(item.identity.clone(), unique.len());
            unique.push(item);
        }
        Self {
            items: unique,
            index,
        }
    }

    pub fn get(&self, identity: &ItemIdentity) -> Option<&CatalogItem> {
        self.index.get(identity).map(|&position| &self.items[position])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for item in &self.items {
            if !seen.iter().any(|c: &&str| c.eq_ignore_ascii_case(&item.category)) {
                seen.push(item.category.as_str());
            }
        }
        seen
    }
}

/// Which valuation applies to an item instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basis {
    #[default]
    Clean,
    Duped,
}

impl Basis {
    pub fn label(&self) -> &'static str {
        match self {
            Basis::Clean => "clean",
            Basis::Duped => "duped",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Basis::Clean => Basis::Duped,
            Basis::Duped => Basis::Clean,
        }
    }
}

/// One occurrence of a catalog item on a trade side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInstance {
    /// Unique per instance; used for basis overrides and duplicate numbering.
    pub key: String,
    pub item: CatalogItem,
    /// Acquisition time in unix seconds, when known.
    #[serde(default)]
    pub acquired_at: Option<i64>,
}

impl ItemInstance {
    pub fn new(key: impl Into<String>, item: CatalogItem) -> Self {
        Self {
            key: key.into(),
            item,
            acquired_at: None,
        }
    }

    pub fn acquired_at(mut self, timestamp: i64) -> Self {
        self.acquired_at = Some(timestamp);
        self
    }

    pub fn identity(&self) -> &ItemIdentity {
        &self.item.identity
    }
}

/// The two parties of a trade comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Offer,
    Request,
}

impl TradeSide {
    pub fn label(&self) -> &'static str {
        match self {
            TradeSide::Offer => "offer",
            TradeSide::Request => "request",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TradeSide::Offer => TradeSide::Request,
            TradeSide::Request => TradeSide::Offer,
        }
    }
}
