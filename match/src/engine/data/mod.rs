//! Data Structures Module
//!
//! Containers backing a symbol's book: price levels, the per-symbol order
//! book with its four order containers, and the depth views published as
//! market data.

pub mod depth;
pub mod orderbook;
pub mod price_level;

pub use depth::{DepthEntry, DepthSnapshot, DepthView};
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
