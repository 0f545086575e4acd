//! Trade valuation and similar-item matching for item-trading communities.
//!
//! - [`domain`] - the pure engine: value parsing, basis resolution, grouping,
//!   side totals, demand scale, similarity search and the two-sided trade state.
//! - [`infra`] - catalog client with memory and disk caching.
//! - [`util`] - persistence of the selection between sessions.
//! - [`config`] - TOML configuration and logging setup.
//!
//! ```
//! use trade_value_scanner::domain::{CatalogItem, ItemIdentity, SearchOptions, TradeSide, TradeState};
//!
//! let pool = vec![
//!     CatalogItem::new(ItemIdentity::base(1), "Torpedo", "Vehicle").with_cash_value("1m"),
//!     CatalogItem::new(ItemIdentity::base(2), "Volt", "Vehicle").with_cash_value("1.05m"),
//! ];
//! let mut state = TradeState::default();
//! state.add(TradeSide::Offer, pool[0].clone(), None);
//!
//! let similar = state.suggest(TradeSide::Offer, &pool, SearchOptions::default());
//! assert_eq!(similar[0].item.name, "Volt");
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod util;
