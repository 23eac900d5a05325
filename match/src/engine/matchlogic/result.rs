//! Result types for matching operations

use crate::engine::entry::{Order, OrderSide, Trade};

/// Why an inbound order was dropped without touching the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Trading on the symbol is suspended
    Halted,
    /// Order was routed to the wrong symbol's engine
    SymbolMismatch,
    /// Nothing left to fill
    NothingToFill,
    /// Limit order without a positive price
    InvalidPrice,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Halted => "halted",
            IgnoreReason::SymbolMismatch => "symbol_mismatch",
            IgnoreReason::NothingToFill => "nothing_to_fill",
            IgnoreReason::InvalidPrice => "invalid_price",
        }
    }
}

/// Everything one matching pass produced
#[derive(Debug, Clone, Default)]
pub struct MatchReport {
    /// Trades in execution order
    pub trades: Vec<Trade>,
    /// Orders that reached `Filled` during the pass
    pub completed: Vec<Order>,
    /// Residual of the inbound order, if it entered a container
    pub resting: Option<Order>,
    /// Depth view sides mutated by the pass
    pub depth_changed: Vec<OrderSide>,
}

impl MatchReport {
    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }

    pub fn mark_depth_changed(&mut self, side: OrderSide) {
        if !self.depth_changed.contains(&side) {
            self.depth_changed.push(side);
        }
    }
}

/// Outcome of [`SymbolEngine::trade`](super::SymbolEngine::trade)
#[derive(Debug, Clone)]
pub enum TradeOutcome {
    /// Silently discarded, no state change and no events
    Ignored(IgnoreReason),
    /// Matched (possibly with zero trades) and the book updated
    Processed(MatchReport),
}

impl TradeOutcome {
    pub fn report(&self) -> Option<&MatchReport> {
        match self {
            TradeOutcome::Processed(report) => Some(report),
            TradeOutcome::Ignored(_) => None,
        }
    }

    pub fn into_report(self) -> Option<MatchReport> {
        match self {
            TradeOutcome::Processed(report) => Some(report),
            TradeOutcome::Ignored(_) => None,
        }
    }

    pub fn trades(&self) -> &[Trade] {
        self.report().map(|r| r.trades.as_slice()).unwrap_or_default()
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, TradeOutcome::Ignored(_))
    }
}
