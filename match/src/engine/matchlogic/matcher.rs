use crate::engine::data::orderbook::{best_price, crosses, LimitMap, MarketQueue};
use crate::engine::data::{DepthView, OrderBook, PriceLevel};
use crate::engine::entry::{CancelRequest, Order, OrderSide, OrderType, SymbolConfig, Trade};
use crate::engine::matchlogic::result::{IgnoreReason, MatchReport, TradeOutcome};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Output of a pass plus the resting quantity it consumed from the opposing
/// depth view, applied in one go once matching is done.
#[derive(Default)]
pub(super) struct Pass {
    pub(super) report: MatchReport,
    depth_deltas: BTreeMap<Decimal, Decimal>,
}

/// Matching engine of a single trading pair.
///
/// Holds the four order containers and the two depth views. All operations
/// take `&self`; containers are individually locked, so an engine is shared
/// as `Arc<SymbolEngine>`. Inbound traffic for one symbol is expected to be
/// serialized by the caller.
#[derive(Debug)]
pub struct SymbolEngine {
    config: SymbolConfig,
    book: OrderBook,
    buy_depth: DepthView,
    sell_depth: DepthView,
    halted: AtomicBool,
    ready: AtomicBool,
}

impl SymbolEngine {
    pub fn new(config: SymbolConfig) -> Self {
        Self {
            book: OrderBook::new(config.name.clone()),
            buy_depth: DepthView::new(OrderSide::Buy, config.max_depth),
            sell_depth: DepthView::new(OrderSide::Sell, config.max_depth),
            halted: AtomicBool::new(config.halted),
            ready: AtomicBool::new(config.ready),
            config,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SymbolConfig {
        &self.config
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn depth(&self, side: OrderSide) -> &DepthView {
        match side {
            OrderSide::Buy => &self.buy_depth,
            OrderSide::Sell => &self.sell_depth,
        }
    }

    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        log::info!("{} trading halted", self.config.name);
    }

    pub fn resume(&self) {
        self.halted.store(false, Ordering::SeqCst);
        log::info!("{} trading resumed", self.config.name);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Matches one inbound order against the book.
    ///
    /// Market orders take liquidity from the opposing limit map and queue any
    /// remainder on their own market queue. Limit orders cross the opposing
    /// limit map, then the opposing market queue, and rest whatever is left.
    pub fn trade(&self, mut order: Order) -> TradeOutcome {
        if self.is_halted() {
            return TradeOutcome::Ignored(IgnoreReason::Halted);
        }
        if order.symbol != self.config.name {
            log::warn!(
                "order {} for {} routed to {} engine",
                order.order_no,
                order.symbol,
                self.config.name
            );
            return TradeOutcome::Ignored(IgnoreReason::SymbolMismatch);
        }
        if order.amount <= Decimal::ZERO
            || order.remaining() <= Decimal::ZERO
            || order.is_completed()
        {
            return TradeOutcome::Ignored(IgnoreReason::NothingToFill);
        }

        let mut pass = Pass::default();
        match order.order_type {
            OrderType::Market => {
                self.match_market_with_limits(&mut order, &mut pass);
            }
            OrderType::Limit => {
                if order.price <= Decimal::ZERO {
                    return TradeOutcome::Ignored(IgnoreReason::InvalidPrice);
                }
                let apportioned = self
                    .config
                    .apportion
                    .as_ref()
                    .map(|window| window.applies_to(&order))
                    .unwrap_or(false);
                if apportioned {
                    self.match_apportioned(&mut order, &mut pass);
                }
                // floored pro-rata dust falls through to price-time
                if !order.is_completed() {
                    self.match_limit_with_limits(&mut order, &mut pass);
                }
                if !order.is_completed() {
                    self.match_limit_with_markets(&mut order, &mut pass);
                }
            }
        }
        self.finish(order, pass)
    }

    /// Removes a resting order. `None` when it is no longer in the book.
    pub fn cancel_order(&self, request: &CancelRequest) -> Option<Order> {
        if request.symbol != self.config.name {
            log::warn!(
                "cancel {} for {} routed to {} engine",
                request.order_no,
                request.symbol,
                self.config.name
            );
            return None;
        }
        let mut order = match request.order_type {
            OrderType::Market => self.book.remove_market_order(request.side, &request.order_no)?,
            OrderType::Limit => {
                let order =
                    self.book
                        .remove_limit_order(request.side, request.price, &request.order_no)?;
                self.depth(order.side).remove(&order, order.remaining());
                order
            }
        };
        order.cancel();
        log::info!("{} order {} cancelled", self.config.name, order.order_no);
        Some(order)
    }

    fn match_market_with_limits(&self, order: &mut Order, pass: &mut Pass) {
        let mut map = self.book.limit_map(order.side.opposite()).lock();
        self.consume_levels(order, &mut map, None, pass);
    }

    fn match_limit_with_limits(&self, order: &mut Order, pass: &mut Pass) {
        let mut map = self.book.limit_map(order.side.opposite()).lock();
        let price = order.price;
        self.consume_levels(order, &mut map, Some(price), pass);
    }

    fn match_limit_with_markets(&self, order: &mut Order, pass: &mut Pass) {
        let mut queue = self.book.market_queue(order.side.opposite()).lock();
        self.consume_queue(order, &mut queue, pass);
    }

    /// Walks the opposing levels from the best price outward. With a
    /// `limit_price` the walk stops at the first level that does not cross.
    fn consume_levels(
        &self,
        order: &mut Order,
        map: &mut LimitMap,
        limit_price: Option<Decimal>,
        pass: &mut Pass,
    ) {
        let opposite = order.side.opposite();
        while let Some(price) = best_price(map, opposite) {
            if let Some(limit_price) = limit_price {
                if !crosses(order.side, limit_price, price) {
                    break;
                }
            }
            let Some(level) = map.get_mut(&price) else {
                break;
            };
            self.consume_level(order, level, pass);
            if !level.is_empty() {
                // the inbound order cannot take more at this price, and
                // every later level is worse
                break;
            }
            map.remove(&price);
            if order.is_completed() {
                break;
            }
        }
    }

    fn consume_level(&self, order: &mut Order, level: &mut PriceLevel, pass: &mut Pass) {
        let mut index = 0;
        while let Some(resting) = level.get_mut(index) {
            self.process_match(order, resting, pass);
            if resting.is_completed() {
                if let Some(done) = level.remove_at(index) {
                    pass.report.completed.push(done);
                }
            } else {
                index += 1;
            }
            if order.is_completed() {
                break;
            }
        }
    }

    fn consume_queue(&self, order: &mut Order, queue: &mut MarketQueue, pass: &mut Pass) {
        let mut index = 0;
        while let Some(resting) = queue.get_mut(index) {
            self.process_match(order, resting, pass);
            if resting.is_completed() {
                if let Some(done) = queue.remove(index) {
                    pass.report.completed.push(done);
                }
            } else {
                index += 1;
            }
            if order.is_completed() {
                break;
            }
        }
    }

    /// One matching step between the inbound order and a resting one.
    ///
    /// The limit side sets the deal price: the resting order's price when it
    /// is a limit order, the inbound order's otherwise.
    pub(super) fn process_match(
        &self,
        incoming: &mut Order,
        resting: &mut Order,
        pass: &mut Pass,
    ) -> Option<Trade> {
        let deal_price = match resting.order_type {
            OrderType::Limit => resting.price,
            OrderType::Market => incoming.price,
        };
        if deal_price <= Decimal::ZERO {
            return None;
        }
        let need = incoming.available_at(deal_price, self.config.base_scale);
        let available = resting.available_at(deal_price, self.config.base_scale);
        let amount = need.min(available);
        if amount <= Decimal::ZERO {
            return None;
        }
        let money = self.config.floor_quote(amount * deal_price);
        Some(self.settle(incoming, resting, deal_price, amount, money, pass))
    }

    /// Books an execution on both orders and records the trade.
    pub(super) fn settle(
        &self,
        incoming: &mut Order,
        resting: &mut Order,
        price: Decimal,
        amount: Decimal,
        money: Decimal,
        pass: &mut Pass,
    ) -> Trade {
        incoming.fill(amount, money);
        resting.fill(amount, money);
        if resting.order_type == OrderType::Limit {
            *pass.depth_deltas.entry(resting.price).or_insert(Decimal::ZERO) += amount;
        }
        let trade = Trade::between(incoming, resting, price, amount, money);
        log::debug!(
            "{} trade {} price {} amount {} buy {} sell {}",
            trade.symbol,
            trade.id,
            trade.price,
            trade.amount,
            trade.buy_order_no,
            trade.sell_order_no
        );
        pass.report.trades.push(trade.clone());
        trade
    }

    /// Settles the inbound order after matching: report it if completed,
    /// otherwise park the residual, then apply the coalesced depth update.
    fn finish(&self, order: Order, mut pass: Pass) -> TradeOutcome {
        let opposite = order.side.opposite();
        if !pass.depth_deltas.is_empty() {
            let deltas: Vec<(Decimal, Decimal)> =
                std::mem::take(&mut pass.depth_deltas).into_iter().collect();
            if self.depth(opposite).remove_many(&deltas) {
                pass.report.mark_depth_changed(opposite);
            }
        }

        if order.is_completed() {
            pass.report.completed.push(order);
        } else {
            match order.order_type {
                OrderType::Limit => {
                    if self.depth(order.side).insert(&order) {
                        pass.report.mark_depth_changed(order.side);
                    }
                    self.book.add_limit_order(order.clone());
                }
                OrderType::Market => {
                    self.book.add_market_order(order.clone());
                }
            }
            pass.report.resting = Some(order);
        }
        TradeOutcome::Processed(pass.report)
    }
}
