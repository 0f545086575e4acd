use serde::Serialize;

use super::{
    entities::{Basis, ItemInstance},
    valuation::resolve,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BasisTally {
    /// Number of instances, not groups.
    pub count: usize,
    pub sum: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub clean: BasisTally,
    pub duped: BasisTally,
}

impl Breakdown {
    pub fn tally(&self, basis: Basis) -> &BasisTally {
        match basis {
            Basis::Clean => &self.clean,
            Basis::Duped => &self.duped,
        }
    }

    fn tally_mut(&mut self, basis: Basis) -> &mut BasisTally {
        match basis {
            Basis::Clean => &mut self.clean,
            Basis::Duped => &mut self.duped,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SideTotals {
    pub total: f64,
    pub breakdown: Breakdown,
}

/// Values every instance of a side with the basis the caller tracks for it.
pub fn totals<F>(side: &[ItemInstance], basis_of: F) -> SideTotals
where
    F: Fn(&ItemInstance) -> Basis,
{
    let mut totals = SideTotals::default();

    for instance in side {
        let valuation = resolve(&instance.item, basis_of(instance));
        totals.total += valuation.amount;
        let tally = totals.breakdown.tally_mut(valuation.basis);
        tally.count += 1;
        tally.sum += valuation.amount;
    }

    tracing::trace!(
        instances = side.len(),
        total = totals.total,
        duped = totals.breakdown.duped.count,
        "computed side totals"
    );

    totals
}

/// `a - b`; positive when side `a` is worth more.
pub fn difference<FA, FB>(side_a: &[ItemInstance], basis_a: FA, side_b: &[ItemInstance], basis_b: FB) -> f64
where
    FA: Fn(&ItemInstance) -> Basis,
    FB: Fn(&ItemInstance) -> Basis,
{
    totals(side_a, basis_a).total - totals(side_b, basis_b).total
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::entities::{CatalogItem, ItemIdentity};

    fn instance(key: &str, id: u64, cash: &str, duped: Option<&str>) -> ItemInstance {
        let mut item = CatalogItem::new(ItemIdentity::base(id), format!("item-{id}"), "Vehicle")
            .with_cash_value(cash);
        if let Some(duped) = duped {
            item = item.with_duped_value(duped);
        }
        ItemInstance::new(key, item)
    }

    fn clean(_: &ItemInstance) -> Basis {
        Basis::Clean
    }

    #[test]
    fn empty_side_is_zeroed() {
        let totals = totals(&[], clean);
        assert_eq!(totals, SideTotals::default());
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn breakdown_counts_instances_per_effective_basis() {
        let side = vec![
            instance("a", 1, "2m", Some("1m")),
            instance("b", 1, "2m", Some("1m")),
            instance("c", 2, "500k", None),
            instance("d", 3, "N/A", None),
        ];
        let duped: HashSet<&str> = ["a", "c"].into_iter().collect();

        let totals = totals(&side, |i| {
            if duped.contains(i.key.as_str()) {
                Basis::Duped
            } else {
                Basis::Clean
            }
        });

        // "c" asked for duped but has no duped value.
        assert_eq!(totals.breakdown.duped, BasisTally { count: 1, sum: 1_000_000.0 });
        assert_eq!(totals.breakdown.clean, BasisTally { count: 3, sum: 2_500_000.0 });
        assert_eq!(totals.total, 3_500_000.0);
        assert_eq!(
            totals.breakdown.clean.count + totals.breakdown.duped.count,
            side.len()
        );
    }

    #[test]
    fn difference_is_antisymmetric() {
        let offer = vec![instance("a", 1, "2m", None), instance("b", 2, "750k", None)];
        let request = vec![instance("c", 3, "3.1m", Some("2m"))];

        let forward = difference(&offer, clean, &request, |_| Basis::Duped);
        let backward = difference(&request, |_| Basis::Duped, &offer, clean);

        assert_eq!(forward, 750_000.0);
        assert_eq!(forward, -backward);
    }
}
