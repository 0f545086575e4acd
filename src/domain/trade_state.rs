use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{
    demand::{average, Demand},
    entities::{Basis, Catalog, CatalogItem, ItemInstance, TradeSide},
    ledger::{totals, SideTotals},
    similarity::{find_similar, SearchOptions, SimilarityCandidate},
};
use crate::util::new_instance_key;

/// Both sides of a trade plus the per-instance basis choices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TradeState {
    pub offer: Vec<ItemInstance>,
    pub request: Vec<ItemInstance>,
    overrides: HashMap<(TradeSide, String), Basis>,
}

impl TradeState {
    pub fn side(&self, side: TradeSide) -> &[ItemInstance] {
        match side {
            TradeSide::Offer => &self.offer,
            TradeSide::Request => &self.request,
        }
    }

    fn side_mut(&mut self, side: TradeSide) -> &mut Vec<ItemInstance> {
        match side {
            TradeSide::Offer => &mut self.offer,
            TradeSide::Request => &mut self.request,
        }
    }

    /// Adds one instance of `item` and returns its key.
    pub fn add(&mut self, side: TradeSide, item: CatalogItem, acquired_at: Option<i64>) -> String {
        let key = new_instance_key();
        let mut instance = ItemInstance::new(key.clone(), item);
        instance.acquired_at = acquired_at;
        self.side_mut(side).push(instance);
        key
    }

    pub fn remove(&mut self, side: TradeSide, key: &str) -> bool {
        let instances = self.side_mut(side);
        let before = instances.len();
        instances.retain(|instance| instance.key != key);
        let removed = instances.len() != before;
        if removed {
            self.overrides.remove(&(side, key.to_string()));
        }
        removed
    }

    pub fn clear(&mut self, side: TradeSide) {
        self.side_mut(side).clear();
        self.overrides.retain(|(owner, _), _| *owner != side);
    }

    /// Records a basis choice. Returns false if no such instance is on the side.
    pub fn set_basis(&mut self, side: TradeSide, key: &str, basis: Basis) -> bool {
        if !self.side(side).iter().any(|instance| instance.key == key) {
            return false;
        }
        match basis {
            Basis::Clean => {
                self.overrides.remove(&(side, key.to_string()));
            }
            Basis::Duped => {
                self.overrides.insert((side, key.to_string()), basis);
            }
        }
        true
    }

    pub fn toggle_basis(&mut self, side: TradeSide, key: &str) -> Option<Basis> {
        let next = self.basis_of(side, key).toggled();
        self.set_basis(side, key, next).then_some(next)
    }

    /// Requested basis for an instance; clean unless overridden.
    pub fn basis_of(&self, side: TradeSide, key: &str) -> Basis {
        self.overrides
            .get(&(side, key.to_string()))
            .copied()
            .unwrap_or_default()
    }

    /// Replaces the opposite side with copies of `from`.
    pub fn mirror(&mut self, from: TradeSide) {
        let to = from.opposite();
        self.clear(to);

        let copies: Vec<(ItemInstance, Basis)> = self
            .side(from)
            .iter()
            .map(|instance| {
                let mut copy = instance.clone();
                copy.key = new_instance_key();
                (copy, self.basis_of(from, &instance.key))
            })
            .collect();

        for (copy, basis) in copies {
            if basis != Basis::Clean {
                self.overrides.insert((to, copy.key.clone()), basis);
            }
            self.side_mut(to).push(copy);
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.offer, &mut self.request);
        self.overrides = std::mem::take(&mut self.overrides)
            .into_iter()
            .map(|((side, key), basis)| ((side.opposite(), key), basis))
            .collect();
    }

    pub fn totals(&self, side: TradeSide) -> SideTotals {
        totals(self.side(side), |instance| self.basis_of(side, &instance.key))
    }

    /// Offer total minus request total.
    pub fn difference(&self) -> f64 {
        self.totals(TradeSide::Offer).total - self.totals(TradeSide::Request).total
    }

    pub fn baseline_demand(&self, side: TradeSide) -> Option<Demand> {
        average(self.side(side).iter().map(|instance| instance.item.demand.as_deref()))
    }

    /// Catalog items worth about as much as `side`, excluding what it already holds.
    pub fn suggest<'a>(
        &self,
        side: TradeSide,
        pool: &'a [CatalogItem],
        mut options: SearchOptions,
    ) -> Vec<SimilarityCandidate<'a>> {
        let target = self.totals(side).total;
        options
            .exclude
            .extend(self.side(side).iter().map(|instance| instance.identity().clone()));
        if options.baseline_demand.is_none() {
            options.baseline_demand = self.baseline_demand(side);
        }
        find_similar(target, pool, &options)
    }

    /// Refreshes item snapshots from a newer catalog. Items no longer listed keep
    /// their previous data. Returns how many instances changed.
    pub fn refresh_from(&mut self, catalog: &Catalog) -> usize {
        let mut changed = 0;
        for instance in self.offer.iter_mut().chain(self.request.iter_mut()) {
            if let Some(fresh) = catalog.get(&instance.item.identity) {
                if *fresh != instance.item {
                    instance.item = fresh.clone();
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.offer = persisted.offer;
        self.request = persisted.request;
        self.overrides = persisted
            .overrides
            .into_iter()
            .filter(|entry| {
                self.side(entry.side)
                    .iter()
                    .any(|instance| instance.key == entry.key)
            })
            .map(|entry| ((entry.side, entry.key), entry.basis))
            .collect();
    }

    pub fn to_persisted(&self) -> PersistedState {
        let mut overrides: Vec<BasisOverride> = self
            .overrides
            .iter()
            .map(|((side, key), basis)| BasisOverride {
                side: *side,
                key: key.clone(),
                basis: *basis,
            })
            .collect();
        overrides.sort_by(|a, b| (a.side.label(), &a.key).cmp(&(b.side.label(), &b.key)));

        PersistedState {
            offer: self.offer.clone(),
            request: self.request.clone(),
            overrides,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasisOverride {
    pub side: TradeSide,
    pub key: String,
    pub basis: Basis,
}

/// Stored form of [`TradeState`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub offer: Vec<ItemInstance>,
    #[serde(default)]
    pub request: Vec<ItemInstance>,
    #[serde(default)]
    pub overrides: Vec<BasisOverride>,
}
