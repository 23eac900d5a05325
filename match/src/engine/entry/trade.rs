//! Trade Records
//!
//! A trade is the immutable result of one matching step between a buy order
//! and a sell order of the same symbol.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{Order, OrderSide};

/// Represents a completed trade in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Unique identifier for the trade
    pub id: String,
    /// Trading symbol for the trade
    pub symbol: String,
    /// Price at which the trade was executed
    pub price: Decimal,
    /// Traded quantity in the base asset
    pub amount: Decimal,
    /// Traded notional in the quote asset
    pub money: Decimal,
    pub buy_order_no: String,
    pub buy_user_id: u64,
    pub sell_order_no: String,
    pub sell_user_id: u64,
    /// Side of the order that triggered the match
    pub taker_side: OrderSide,
    /// Timestamp when the trade was created
    pub created_at: DateTime<Utc>,
}

impl Trade {
    /// Builds a trade between `taker` and `maker`.
    ///
    /// Buy and sell legs are assigned by each order's own side, not by which
    /// one arrived last.
    pub fn between(taker: &Order, maker: &Order, price: Decimal, amount: Decimal, money: Decimal) -> Self {
        let (buy, sell) = match taker.side {
            OrderSide::Buy => (taker, maker),
            OrderSide::Sell => (maker, taker),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            symbol: taker.symbol.clone(),
            price,
            amount,
            money,
            buy_order_no: buy.order_no.clone(),
            buy_user_id: buy.user_id,
            sell_order_no: sell.order_no.clone(),
            sell_user_id: sell.user_id,
            taker_side: taker.side,
            created_at: Utc::now(),
        }
    }
}
