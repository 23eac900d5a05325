use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Limit,
    Market,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A unit of trading intent resident in one symbol's book.
///
/// `amount` is denominated in the traded asset, except for market buys where
/// it is the quote-asset notional the buyer is willing to spend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_no: String,
    pub user_id: u64,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    #[serde(default)]
    pub price: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub filled_amount: Decimal,
    #[serde(default)]
    pub filled_money: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn limit(
        order_no: impl Into<String>,
        user_id: u64,
        symbol: impl Into<String>,
        side: OrderSide,
        price: Decimal,
        amount: Decimal,
    ) -> Self {
        Self {
            order_no: order_no.into(),
            user_id,
            symbol: symbol.into(),
            order_type: OrderType::Limit,
            side,
            price,
            amount,
            filled_amount: Decimal::ZERO,
            filled_money: Decimal::ZERO,
            status: OrderStatus::Open,
            created_at: Utc::now(),
        }
    }

    pub fn market(
        order_no: impl Into<String>,
        user_id: u64,
        symbol: impl Into<String>,
        side: OrderSide,
        amount: Decimal,
    ) -> Self {
        Self {
            order_type: OrderType::Market,
            ..Self::limit(order_no, user_id, symbol, side, Decimal::ZERO, amount)
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_market_buy(&self) -> bool {
        self.order_type == OrderType::Market && self.side == OrderSide::Buy
    }

    /// Unfilled traded-asset quantity.
    pub fn remaining(&self) -> Decimal {
        self.amount - self.filled_amount
    }

    /// Quantity this order can still trade at `deal_price`.
    ///
    /// Market buys are sized by notional, so their leftover money is converted
    /// into base quantity and floored to `base_scale`.
    pub fn available_at(&self, deal_price: Decimal, base_scale: u32) -> Decimal {
        if self.is_market_buy() {
            if deal_price <= Decimal::ZERO {
                return Decimal::ZERO;
            }
            let left_money = self.amount - self.filled_money;
            if left_money <= Decimal::ZERO {
                return Decimal::ZERO;
            }
            (left_money / deal_price).round_dp_with_strategy(base_scale, RoundingStrategy::ToZero)
        } else {
            self.remaining().max(Decimal::ZERO)
        }
    }

    pub fn is_completed(&self) -> bool {
        if self.status.is_terminal() {
            return true;
        }
        if self.is_market_buy() {
            self.filled_money >= self.amount
        } else {
            self.filled_amount >= self.amount
        }
    }

    /// Books one execution against this order. Terminal orders are left untouched.
    pub fn fill(&mut self, quantity: Decimal, money: Decimal) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.filled_amount += quantity;
        self.filled_money += money;
        self.update_status();
        true
    }

    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = OrderStatus::Cancelled;
        }
    }

    fn update_status(&mut self) {
        if self.is_completed() {
            self.status = OrderStatus::Filled;
        } else if self.filled_amount > Decimal::ZERO {
            self.status = OrderStatus::PartiallyFilled;
        }
    }
}

/// Locator of a resting order, as sent by the cancellation path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub symbol: String,
    pub order_no: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    #[serde(default)]
    pub price: Decimal,
}

impl From<&Order> for CancelRequest {
    fn from(order: &Order) -> Self {
        Self {
            symbol: order.symbol.clone(),
            order_no: order.order_no.clone(),
            side: order.side,
            order_type: order.order_type,
            price: order.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fill_moves_through_statuses() {
        let mut order = Order::limit("1", 7, "BTCUSDT", OrderSide::Sell, dec!(100), dec!(1));
        assert_eq!(order.status, OrderStatus::Open);

        assert!(order.fill(dec!(0.4), dec!(40)));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), dec!(0.6));

        assert!(order.fill(dec!(0.6), dec!(60)));
        assert_eq!(order.status, OrderStatus::Filled);
        assert!(order.is_completed());
    }

    #[test]
    fn terminal_orders_are_not_mutated() {
        let mut order = Order::limit("1", 7, "BTCUSDT", OrderSide::Buy, dec!(100), dec!(1));
        order.cancel();
        assert!(!order.fill(dec!(0.5), dec!(50)));
        assert_eq!(order.filled_amount, Decimal::ZERO);
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn market_buy_is_sized_by_notional() {
        let mut order = Order::market("2", 7, "BTCUSDT", OrderSide::Buy, dec!(250));
        assert_eq!(order.available_at(dec!(100), 8), dec!(2.5));
        assert_eq!(order.available_at(dec!(300), 2), dec!(0.83));

        order.fill(dec!(2), dec!(200));
        assert_eq!(order.status, OrderStatus::PartiallyFilled);
        assert_eq!(order.available_at(dec!(100), 8), dec!(0.5));

        order.fill(dec!(0.5), dec!(50));
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn market_order_deserializes_without_price() {
        let raw = r#"{"order_no":"9","user_id":1,"symbol":"BTCUSDT","order_type":"market","side":"sell","amount":"1.5"}"#;
        let order: Order = serde_json::from_str(raw).unwrap();
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.price, Decimal::ZERO);
        assert_eq!(order.amount, dec!(1.5));
        assert_eq!(order.status, OrderStatus::Open);
    }
}
