//! Symbol Configuration
//!
//! Per-symbol settings the matching engine is constructed with: decimal scales
//! for the traded and quote assets, depth view size, initial halt/ready flags
//! and the optional proportional allocation window.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::order::{Order, OrderSide, OrderType};

pub const DEFAULT_SCALE: u32 = 8;
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Time-boxed issuance window during which incoming limit orders on `side`
/// are allocated pro rata across the opposing book instead of price-time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApportionWindow {
    /// Orders created strictly before this instant are apportioned
    pub cutoff: DateTime<Utc>,
    /// Side of the incoming order that triggers apportionment
    #[serde(default = "ApportionWindow::default_side")]
    pub side: OrderSide,
}

impl ApportionWindow {
    pub fn new(cutoff: DateTime<Utc>, side: OrderSide) -> Self {
        Self { cutoff, side }
    }

    fn default_side() -> OrderSide {
        OrderSide::Sell
    }

    pub fn applies_to(&self, order: &Order) -> bool {
        order.order_type == OrderType::Limit
            && order.side == self.side
            && order.created_at < self.cutoff
    }
}

/// Configuration of one trading pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// Name of the trading pair (e.g., "BTCUSDT")
    pub name: String,
    /// Decimal places of the traded asset
    #[serde(default = "default_scale")]
    pub base_scale: u32,
    /// Decimal places of the quote asset
    #[serde(default = "default_scale")]
    pub quote_scale: u32,
    /// Maximum rows kept in each depth view
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Start with matching suspended
    #[serde(default)]
    pub halted: bool,
    /// Start ready to accept traffic
    #[serde(default = "default_ready")]
    pub ready: bool,
    #[serde(default)]
    pub apportion: Option<ApportionWindow>,
}

fn default_scale() -> u32 {
    DEFAULT_SCALE
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_ready() -> bool {
    true
}

impl SymbolConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_scale: DEFAULT_SCALE,
            quote_scale: DEFAULT_SCALE,
            max_depth: DEFAULT_MAX_DEPTH,
            halted: false,
            ready: true,
            apportion: None,
        }
    }

    pub fn with_scales(mut self, base_scale: u32, quote_scale: u32) -> Self {
        self.base_scale = base_scale;
        self.quote_scale = quote_scale;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_apportion(mut self, window: ApportionWindow) -> Self {
        self.apportion = Some(window);
        self
    }

    /// Floors a traded-asset quantity to the base scale
    pub fn floor_base(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.base_scale, RoundingStrategy::ToZero)
    }

    /// Floors a quote-asset amount to the quote scale
    pub fn floor_quote(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.quote_scale, RoundingStrategy::ToZero)
    }
}
