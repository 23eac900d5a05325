//! Match Logic Module
//!
//! Per-symbol matching: price-time priority between limit and market orders,
//! the pro-rata allocation mode used during issuance windows, and the result
//! types a matching pass returns.

mod apportion;
pub mod matcher;
pub mod result;

pub use matcher::SymbolEngine;
pub use result::{IgnoreReason, MatchReport, TradeOutcome};
