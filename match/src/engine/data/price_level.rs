//! Price level aggregate
//!
//! All resting orders at one exact limit price, kept in arrival order so that
//! time priority is structural: the front of the queue is always consumed first.

use rust_decimal::Decimal;
use std::collections::VecDeque;

use crate::engine::entry::Order;

#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Decimal,
    orders: VecDeque<Order>,
}

impl PriceLevel {
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Queues an order behind every order already at this price
    pub fn append(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price);
        self.orders.push_back(order);
    }

    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Order> {
        self.orders.get_mut(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Order> {
        self.orders.remove(index)
    }

    pub fn remove(&mut self, order_no: &str) -> Option<Order> {
        let position = self.orders.iter().position(|o| o.order_no == order_no)?;
        self.orders.remove(position)
    }

    /// Removes completed orders, preserving the queue order of the rest.
    pub fn take_completed(&mut self) -> Vec<Order> {
        let mut completed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.orders.len());
        for order in self.orders.drain(..) {
            if order.is_completed() {
                completed.push(order);
            } else {
                kept.push_back(order);
            }
        }
        self.orders = kept;
        completed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        self.orders.iter_mut()
    }

    pub fn size(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Sum of requested amounts of every member; only pro-rata allocation uses it
    pub fn total_amount(&self) -> Decimal {
        self.orders.iter().map(|o| o.amount).sum()
    }

    pub fn remaining_amount(&self) -> Decimal {
        self.orders.iter().map(|o| o.remaining()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::OrderSide;
    use rust_decimal_macros::dec;

    fn sell(no: &str, amount: Decimal) -> Order {
        Order::limit(no, 1, "BTCUSDT", OrderSide::Sell, dec!(100), amount)
    }

    #[test]
    fn consumes_in_arrival_order() {
        let mut level = PriceLevel::new(dec!(100));
        level.append(sell("a", dec!(1)));
        level.append(sell("b", dec!(2)));
        level.append(sell("c", dec!(3)));

        assert_eq!(level.size(), 3);
        assert_eq!(level.front().unwrap().order_no, "a");
        assert_eq!(level.pop_front().unwrap().order_no, "a");
        assert_eq!(level.pop_front().unwrap().order_no, "b");
        assert_eq!(level.front().unwrap().order_no, "c");
    }

    #[test]
    fn totals_and_removal() {
        let mut level = PriceLevel::new(dec!(100));
        level.append(sell("a", dec!(10)));
        level.append(sell("b", dec!(30)));
        assert_eq!(level.total_amount(), dec!(40));

        level.front_mut().unwrap().fill(dec!(4), dec!(400));
        assert_eq!(level.total_amount(), dec!(40));
        assert_eq!(level.remaining_amount(), dec!(36));

        assert_eq!(level.remove("b").unwrap().order_no, "b");
        assert!(level.remove("b").is_none());
        assert_eq!(level.size(), 1);
    }

    #[test]
    fn take_completed_keeps_queue_order() {
        let mut level = PriceLevel::new(dec!(100));
        level.append(sell("a", dec!(1)));
        level.append(sell("b", dec!(1)));
        level.append(sell("c", dec!(1)));
        for order in level.iter_mut().filter(|o| o.order_no != "b") {
            order.fill(dec!(1), dec!(100));
        }

        let done: Vec<_> = level.take_completed().into_iter().map(|o| o.order_no).collect();
        assert_eq!(done, vec!["a", "c"]);
        assert_eq!(level.size(), 1);
        assert_eq!(level.price(), dec!(100));
    }
}
