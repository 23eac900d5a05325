//! Spot order matching core.
//!
//! One [`SymbolEngine`](engine::matchlogic::SymbolEngine) per trading pair owns
//! the resting book and runs price-time (or pro-rata) matching; the
//! [`EngineRegistry`](engine::spot::EngineRegistry) hands engines out by symbol
//! and the [`OutboundPublisher`](engine::sink::OutboundPublisher) forwards
//! trades, completions and depth snapshots to an event sink.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod server;

pub use error::{MatchError, SinkError};
