//! Trade valuation and similar-item matching.

pub mod demand;
pub mod entities;
pub mod grouping;
pub mod ledger;
pub mod similarity;
pub mod trade_state;
pub mod valuation;
pub mod value;

pub use demand::Demand;
pub use entities::{Basis, Catalog, CatalogItem, ItemIdentity, ItemInstance, TradeSide};
pub use grouping::{group, order_duplicates, GroupedEntry};
pub use ledger::{difference, totals, BasisTally, Breakdown, SideTotals};
pub use similarity::{find_similar, SearchOptions, SimilarityCandidate, SimilaritySort};
pub use trade_state::{BasisOverride, PersistedState, TradeState};
pub use valuation::{resolve, Valuation};
pub use value::normalize;
