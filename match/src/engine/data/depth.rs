//! Depth view
//!
//! Bounded, price-ordered market-data summary of resting limit quantity for
//! one side of a symbol. It is advisory: the matching containers in
//! [`OrderBook`](super::OrderBook) stay authoritative, and rows beyond the
//! configured depth are dropped rather than tracked.

use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::entry::{Order, OrderSide, OrderType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthEntry {
    pub price: Decimal,
    pub amount: Decimal,
}

/// Point-in-time copy of a depth view, as handed to the publisher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub symbol: String,
    pub side: OrderSide,
    pub best: Option<Decimal>,
    pub worst: Option<Decimal>,
    pub entries: Vec<DepthEntry>,
}

#[derive(Debug)]
pub struct DepthView {
    side: OrderSide,
    max_depth: usize,
    entries: Mutex<Vec<DepthEntry>>,
}

impl DepthView {
    pub fn new(side: OrderSide, max_depth: usize) -> Self {
        Self {
            side,
            max_depth,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    // Bids are kept descending, asks ascending.
    fn is_better(&self, price: Decimal, than: Decimal) -> bool {
        match self.side {
            OrderSide::Buy => price > than,
            OrderSide::Sell => price < than,
        }
    }

    /// Adds the order's remaining quantity at its price.
    ///
    /// Returns false when nothing changed: market orders, orders of the other
    /// side, and new prices that would land beyond `max_depth`.
    pub fn insert(&self, order: &Order) -> bool {
        if order.order_type == OrderType::Market || order.side != self.side {
            return false;
        }
        let remaining = order.remaining();
        if remaining <= Decimal::ZERO {
            return false;
        }

        let mut entries = self.entries.lock();
        let mut index = 0;
        while index < entries.len() {
            let entry = &mut entries[index];
            if entry.price == order.price {
                entry.amount += remaining;
                return true;
            }
            if self.is_better(order.price, entry.price) {
                break;
            }
            index += 1;
        }

        if index >= self.max_depth {
            return false;
        }
        entries.insert(
            index,
            DepthEntry {
                price: order.price,
                amount: remaining,
            },
        );
        entries.truncate(self.max_depth);
        true
    }

    pub fn remove(&self, order: &Order, amount: Decimal) -> bool {
        if order.order_type == OrderType::Market || order.side != self.side {
            return false;
        }
        self.remove_at(order.price, amount)
    }

    /// Subtracts `amount` at `price`, dropping the row once it reaches zero.
    pub fn remove_at(&self, price: Decimal, amount: Decimal) -> bool {
        self.remove_many(&[(price, amount)])
    }

    /// Applies several removals under a single lock acquisition.
    pub fn remove_many(&self, deltas: &[(Decimal, Decimal)]) -> bool {
        let mut entries = self.entries.lock();
        let mut changed = false;
        for (price, amount) in deltas {
            if let Some(index) = entries.iter().position(|e| e.price == *price) {
                entries[index].amount -= *amount;
                if entries[index].amount <= Decimal::ZERO {
                    entries.remove(index);
                }
                changed = true;
            }
        }
        changed
    }

    pub fn best_price(&self) -> Option<Decimal> {
        self.entries.lock().first().map(|e| e.price)
    }

    pub fn worst_price(&self) -> Option<Decimal> {
        self.entries.lock().last().map(|e| e.price)
    }

    pub fn depth(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn entries(&self) -> Vec<DepthEntry> {
        self.entries.lock().clone()
    }

    pub fn snapshot(&self, symbol: &str) -> DepthSnapshot {
        let entries = self.entries.lock().clone();
        DepthSnapshot {
            symbol: symbol.to_string(),
            side: self.side,
            best: entries.first().map(|e| e.price),
            worst: entries.last().map(|e| e.price),
            entries,
        }
    }
}
