//! Search for catalog items worth about as much as a target amount.

use std::{cmp::Ordering, collections::HashSet, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    demand::{delta, index_of, Demand},
    entities::{Basis, CatalogItem, ItemIdentity},
    valuation::duped_available,
    value::normalize,
};

pub const DEFAULT_RANGE: f64 = 2_000_000.0;
pub const DEFAULT_LIMIT: usize = 12;

/// Ordering applied to candidates that fall inside the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilaritySort {
    #[default]
    Proximity,
    DemandDesc,
    DemandAsc,
}

impl SimilaritySort {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Proximity => "Closest value",
            Self::DemandDesc => "Highest demand",
            Self::DemandAsc => "Lowest demand",
        }
    }
}

impl FromStr for SimilaritySort {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "proximity" | "closest" => Ok(Self::Proximity),
            "demand-desc" | "demand" => Ok(Self::DemandDesc),
            "demand-asc" => Ok(Self::DemandAsc),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchOptions {
    /// Identities never returned, usually the items already on the target's side.
    pub exclude: HashSet<ItemIdentity>,
    /// Case-insensitive category restriction.
    pub type_filter: Option<String>,
    /// Symmetric tolerance around the target.
    pub range: f64,
    pub sort: SimilaritySort,
    pub basis: Basis,
    pub baseline_demand: Option<Demand>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            exclude: HashSet::new(),
            type_filter: None,
            range: DEFAULT_RANGE,
            sort: SimilaritySort::default(),
            basis: Basis::Clean,
            baseline_demand: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityCandidate<'a> {
    pub item: &'a CatalogItem,
    pub value: f64,
    pub value_delta: f64,
    pub demand_delta: Option<i32>,
}

impl SearchOptions {
    fn matches(&self, item: &CatalogItem) -> bool {
        if self.exclude.contains(&item.identity) {
            return false;
        }
        if self.basis == Basis::Duped && !duped_available(item) {
            return false;
        }
        if let Some(ref category) = self.type_filter {
            if !item.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        true
    }

    fn comparison_value(&self, item: &CatalogItem) -> f64 {
        match self.basis {
            Basis::Duped => normalize(item.duped_value.as_deref()),
            Basis::Clean => normalize(item.cash_value.as_deref()),
        }
    }
}

/// Returns up to `options.limit` items whose value lies within
/// `[max(0, target - range), target + range]`.
pub fn find_similar<'a>(
    target: f64,
    pool: &'a [CatalogItem],
    options: &SearchOptions,
) -> Vec<SimilarityCandidate<'a>> {
    if target.is_nan() || target <= 0.0 || pool.is_empty() {
        return Vec::new();
    }

    let range = if options.range.is_finite() {
        options.range.max(0.0)
    } else {
        0.0
    };
    let lower = (target - range).max(0.0);
    let upper = target + range;

    let mut candidates: Vec<SimilarityCandidate<'a>> = pool
        .iter()
        .filter(|item| options.matches(item))
        .filter_map(|item| {
            let value = options.comparison_value(item);
            if value < lower || value > upper {
                return None;
            }
            Some(SimilarityCandidate {
                item,
                value,
                value_delta: (value - target).abs(),
                demand_delta: None,
            })
        })
        .collect();

    sort_candidates(&mut candidates, options.sort);
    candidates.truncate(options.limit);

    if let Some(baseline) = options.baseline_demand {
        for candidate in &mut candidates {
            candidate.demand_delta = delta(candidate.item.demand.as_deref(), Some(baseline.label()));
        }
    }

    tracing::debug!(
        target,
        range,
        pool = pool.len(),
        returned = candidates.len(),
        sort = options.sort.label(),
        "similarity search"
    );

    candidates
}

/// Stable, so equal keys keep pool order.
fn sort_candidates(candidates: &mut [SimilarityCandidate<'_>], sort: SimilaritySort) {
    let demand_rank = |candidate: &SimilarityCandidate<'_>| {
        index_of(candidate.item.demand.as_deref()).map_or(-1, |index| index as i64)
    };

    candidates.sort_by(|a, b| match sort {
        SimilaritySort::Proximity => a
            .value_delta
            .partial_cmp(&b.value_delta)
            .unwrap_or(Ordering::Equal),
        SimilaritySort::DemandDesc => demand_rank(b).cmp(&demand_rank(a)),
        SimilaritySort::DemandAsc => demand_rank(a).cmp(&demand_rank(b)),
    });
}
