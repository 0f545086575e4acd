use super::{
    entities::{Basis, CatalogItem},
    value::{is_unknown, normalize},
};

/// Basis actually applied to an item and the amount it yields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Valuation {
    pub basis: Basis,
    pub amount: f64,
}

pub fn duped_available(item: &CatalogItem) -> bool {
    !is_unknown(item.duped_value.as_deref())
}

/// Resolves the requested basis for an item. A duped request on an item
/// without a duped value is valued clean instead.
pub fn resolve(item: &CatalogItem, requested: Basis) -> Valuation {
    match requested {
        Basis::Duped if duped_available(item) => Valuation {
            basis: Basis::Duped,
            amount: normalize(item.duped_value.as_deref()),
        },
        _ => Valuation {
            basis: Basis::Clean,
            amount: normalize(item.cash_value.as_deref()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ItemIdentity;

    fn item(cash: &str, duped: Option<&str>) -> CatalogItem {
        let item = CatalogItem::new(ItemIdentity::base(1), "Volt", "Vehicle").with_cash_value(cash);
        match duped {
            Some(value) => item.with_duped_value(value),
            None => item,
        }
    }

    #[test]
    fn duped_request_without_duped_value_falls_back_to_clean() {
        for duped in [None, Some("N/A"), Some("unknown")] {
            let valuation = resolve(&item("3m", duped), Basis::Duped);
            assert_eq!(valuation.basis, Basis::Clean);
            assert_eq!(valuation.amount, 3_000_000.0);
        }
    }

    #[test]
    fn duped_value_is_used_when_available() {
        let volt = item("3m", Some("1.5m"));
        assert_eq!(
            resolve(&volt, Basis::Duped),
            Valuation {
                basis: Basis::Duped,
                amount: 1_500_000.0
            }
        );
        assert_eq!(resolve(&volt, Basis::Clean).basis, Basis::Clean);
        assert_eq!(resolve(&volt, Basis::Clean).amount, 3_000_000.0);
    }

    #[test]
    fn explicit_zero_duped_value_counts_as_available() {
        let valuation = resolve(&item("3m", Some("0")), Basis::Duped);
        assert_eq!(valuation.basis, Basis::Duped);
        assert_eq!(valuation.amount, 0.0);
    }
}
