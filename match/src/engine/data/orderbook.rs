use crate::engine::data::PriceLevel;
use crate::engine::entry::{Order, OrderSide, OrderType};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

/// Price -> level. Iteration direction depends on the side the map holds.
pub type LimitMap = BTreeMap<Decimal, PriceLevel>;
pub type MarketQueue = VecDeque<Order>;

/// Best price of a map holding `side` orders: highest bid or lowest ask.
pub fn best_price(map: &LimitMap, side: OrderSide) -> Option<Decimal> {
    match side {
        OrderSide::Buy => map.keys().next_back().copied(),
        OrderSide::Sell => map.keys().next().copied(),
    }
}

/// Prices of the opposing map that an incoming `side` limit at `limit`
/// crosses, best first. Non-crossing levels are never visited.
pub fn crossing_prices(map: &LimitMap, side: OrderSide, limit: Decimal) -> Vec<Decimal> {
    match side {
        OrderSide::Buy => map.range(..=limit).map(|(price, _)| *price).collect(),
        OrderSide::Sell => map.range(limit..).rev().map(|(price, _)| *price).collect(),
    }
}

/// Whether a resting level at `resting_price` crosses an incoming limit order.
pub fn crosses(incoming_side: OrderSide, incoming_price: Decimal, resting_price: Decimal) -> bool {
    match incoming_side {
        OrderSide::Buy => resting_price <= incoming_price,
        OrderSide::Sell => resting_price >= incoming_price,
    }
}

/// Resting orders of one symbol: a limit map and a market queue per side.
///
/// Every container has its own lock so a cancellation only contends with a
/// matching pass that is working on the same container.
#[derive(Debug)]
pub struct OrderBook {
    symbol: String,
    buy_limit: Mutex<LimitMap>,
    sell_limit: Mutex<LimitMap>,
    buy_market: Mutex<MarketQueue>,
    sell_market: Mutex<MarketQueue>,
}

impl OrderBook {
    pub fn new(symbol: String) -> Self {
        Self {
            symbol,
            buy_limit: Mutex::new(BTreeMap::new()),
            sell_limit: Mutex::new(BTreeMap::new()),
            buy_market: Mutex::new(VecDeque::new()),
            sell_market: Mutex::new(VecDeque::new()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn limit_map(&self, side: OrderSide) -> &Mutex<LimitMap> {
        match side {
            OrderSide::Buy => &self.buy_limit,
            OrderSide::Sell => &self.sell_limit,
        }
    }

    pub fn market_queue(&self, side: OrderSide) -> &Mutex<MarketQueue> {
        match side {
            OrderSide::Buy => &self.buy_market,
            OrderSide::Sell => &self.sell_market,
        }
    }

    pub fn add_limit_order(&self, order: Order) {
        let mut map = self.limit_map(order.side).lock();
        map.entry(order.price)
            .or_insert_with(|| PriceLevel::new(order.price))
            .append(order);
    }

    pub fn add_market_order(&self, order: Order) {
        self.market_queue(order.side).lock().push_back(order);
    }

    pub fn remove_limit_order(&self, side: OrderSide, price: Decimal, order_no: &str) -> Option<Order> {
        let mut map = self.limit_map(side).lock();
        let level = map.get_mut(&price)?;
        let removed = level.remove(order_no);
        if level.is_empty() {
            map.remove(&price);
        }
        removed
    }

    pub fn remove_market_order(&self, side: OrderSide, order_no: &str) -> Option<Order> {
        let mut queue = self.market_queue(side).lock();
        let position = queue.iter().position(|o| o.order_no == order_no)?;
        queue.remove(position)
    }

    pub fn get_best_bid(&self) -> Option<Decimal> {
        best_price(&self.buy_limit.lock(), OrderSide::Buy)
    }

    pub fn get_best_ask(&self) -> Option<Decimal> {
        best_price(&self.sell_limit.lock(), OrderSide::Sell)
    }

    pub fn get_spread(&self) -> Option<Decimal> {
        match (self.get_best_ask(), self.get_best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Finds a resting order by number in any container.
    pub fn get_order(&self, order_no: &str) -> Option<Order> {
        for side in [OrderSide::Buy, OrderSide::Sell] {
            let found = self
                .limit_map(side)
                .lock()
                .values()
                .flat_map(|level| level.iter())
                .find(|o| o.order_no == order_no)
                .cloned();
            if found.is_some() {
                return found;
            }
            let found = self
                .market_queue(side)
                .lock()
                .iter()
                .find(|o| o.order_no == order_no)
                .cloned();
            if found.is_some() {
                return found;
            }
        }
        None
    }

    pub fn order_count(&self, side: OrderSide, order_type: OrderType) -> usize {
        match order_type {
            OrderType::Limit => self.limit_map(side).lock().values().map(|l| l.size()).sum(),
            OrderType::Market => self.market_queue(side).lock().len(),
        }
    }

    pub fn level_count(&self, side: OrderSide) -> usize {
        self.limit_map(side).lock().len()
    }

    pub fn is_empty(&self) -> bool {
        [OrderSide::Buy, OrderSide::Sell].iter().all(|side| {
            self.limit_map(*side).lock().is_empty() && self.market_queue(*side).lock().is_empty()
        })
    }
}
