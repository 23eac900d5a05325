//! Pro-rata allocation used while an issuance window is open.
//!
//! Instead of consuming the opposing book first-come-first-served, the inbound
//! quantity is split across every crossing resting order in proportion to its
//! requested amount. Each share is floored to the base scale and executes at
//! the resting order's price. Whatever flooring leaves over is matched by
//! price-time afterwards.

use rust_decimal::Decimal;

use crate::engine::data::orderbook::crossing_prices;
use crate::engine::entry::Order;
use crate::engine::matchlogic::matcher::{Pass, SymbolEngine};

/// `amount * part / total`. The product of two large amounts can leave the
/// decimal range, in which case the ratio is taken first.
fn pro_rata(amount: Decimal, part: Decimal, total: Decimal) -> Decimal {
    amount
        .checked_mul(part)
        .and_then(|product| product.checked_div(total))
        .unwrap_or_else(|| amount * (part / total))
}

impl SymbolEngine {
    pub(super) fn match_apportioned(&self, order: &mut Order, pass: &mut Pass) {
        let opposite = order.side.opposite();
        let scale = self.config().base_scale;
        let mut map = self.book().limit_map(opposite).lock();

        let prices = crossing_prices(&map, order.side, order.price);
        let total: Decimal = prices
            .iter()
            .filter_map(|price| map.get(price))
            .map(|level| level.total_amount())
            .sum();
        if total <= Decimal::ZERO {
            return;
        }

        for price in prices {
            let Some(level) = map.get_mut(&price) else {
                continue;
            };
            for resting in level.iter_mut() {
                if order.is_completed() {
                    break;
                }
                let share = self.config().floor_base(pro_rata(order.amount, resting.amount, total));
                let amount = share
                    .min(resting.available_at(price, scale))
                    .min(order.available_at(price, scale));
                if amount <= Decimal::ZERO {
                    continue;
                }
                let money = self.config().floor_quote(amount * price);
                self.settle(order, resting, price, amount, money, pass);
            }
            pass.report.completed.extend(level.take_completed());
            if level.is_empty() {
                map.remove(&price);
            }
            if order.is_completed() {
                break;
            }
        }
        log::debug!(
            "{} apportioned order {} filled {} of {} across total {}",
            self.symbol(),
            order.order_no,
            order.filled_amount,
            order.amount,
            total
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::entry::{ApportionWindow, Order, OrderSide, OrderStatus, SymbolConfig};
    use crate::engine::matchlogic::SymbolEngine;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    const SYMBOL: &str = "NEWUSDT";

    fn engine(side: OrderSide, scale: u32) -> SymbolEngine {
        let window = ApportionWindow::new(Utc::now() + Duration::hours(1), side);
        SymbolEngine::new(
            SymbolConfig::new(SYMBOL)
                .with_scales(scale, 8)
                .with_apportion(window),
        )
    }

    #[test]
    fn issuance_sell_is_split_across_bids() {
        let engine = engine(OrderSide::Sell, 8);
        engine.trade(Order::limit("b1", 1, SYMBOL, OrderSide::Buy, dec!(2), dec!(10)));
        engine.trade(Order::limit("b2", 2, SYMBOL, OrderSide::Buy, dec!(1), dec!(30)));

        let outcome = engine.trade(Order::limit("issue", 9, SYMBOL, OrderSide::Sell, dec!(1), dec!(8)));
        let report = outcome.into_report().unwrap();

        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].buy_order_no, "b1");
        assert_eq!(report.trades[0].amount, dec!(2));
        assert_eq!(report.trades[0].price, dec!(2));
        assert_eq!(report.trades[1].buy_order_no, "b2");
        assert_eq!(report.trades[1].amount, dec!(6));
        assert_eq!(report.trades[1].price, dec!(1));

        let issue = report.completed.iter().find(|o| o.order_no == "issue").unwrap();
        assert_eq!(issue.status, OrderStatus::Filled);
        assert!(report.resting.is_none());
        assert_eq!(engine.book().get_order("b2").unwrap().filled_amount, dec!(6));
    }

    #[test]
    fn floored_dust_falls_back_to_price_time() {
        let engine = engine(OrderSide::Sell, 0);
        engine.trade(Order::limit("b1", 1, SYMBOL, OrderSide::Buy, dec!(1), dec!(1)));
        engine.trade(Order::limit("b2", 2, SYMBOL, OrderSide::Buy, dec!(1), dec!(1)));
        engine.trade(Order::limit("b3", 3, SYMBOL, OrderSide::Buy, dec!(1), dec!(1)));

        // 2 * 1/3 floors to 0 for every bidder
        let report = engine
            .trade(Order::limit("issue", 9, SYMBOL, OrderSide::Sell, dec!(1), dec!(2)))
            .into_report()
            .unwrap();
        let buyers: Vec<_> = report.trades.iter().map(|t| t.buy_order_no.as_str()).collect();
        assert_eq!(buyers, vec!["b1", "b2"]);
        assert!(report.resting.is_none());
        assert_eq!(engine.book().get_order("b3").unwrap().filled_amount, dec!(0));
        assert_eq!(engine.book().get_best_ask(), None);
    }

    #[test]
    fn orders_after_cutoff_use_price_time() {
        let engine = engine(OrderSide::Sell, 8);
        engine.trade(Order::limit("b1", 1, SYMBOL, OrderSide::Buy, dec!(1), dec!(10)));
        engine.trade(Order::limit("b2", 2, SYMBOL, OrderSide::Buy, dec!(1), dec!(30)));

        let late = Order::limit("late", 9, SYMBOL, OrderSide::Sell, dec!(1), dec!(8))
            .with_created_at(Utc::now() + Duration::hours(2));
        let report = engine.trade(late).into_report().unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].buy_order_no, "b1");
        assert_eq!(report.trades[0].amount, dec!(8));
    }

    #[test]
    fn large_supply_is_split_without_overflow() {
        let engine = engine(OrderSide::Sell, 8);
        engine.trade(Order::limit("b1", 1, SYMBOL, OrderSide::Buy, dec!(0.00001), dec!(300000000000000)));
        engine.trade(Order::limit("b2", 2, SYMBOL, OrderSide::Buy, dec!(0.00001), dec!(300000000000000)));

        let report = engine
            .trade(Order::limit("issue", 9, SYMBOL, OrderSide::Sell, dec!(0.00001), dec!(500000000000000)))
            .into_report()
            .unwrap();
        let allocations: Vec<_> = report
            .trades
            .iter()
            .map(|t| (t.buy_order_no.as_str(), t.amount))
            .collect();
        assert_eq!(
            allocations,
            vec![("b1", dec!(250000000000000)), ("b2", dec!(250000000000000))]
        );
        assert_eq!(report.trades[0].money, dec!(2500000000));
        assert!(report.resting.is_none());
    }

    #[test]
    fn share_keeps_precision_when_product_fits() {
        // ratio-first would give 0.999.. and floor to zero
        assert_eq!(super::pro_rata(dec!(3), dec!(1), dec!(3)), dec!(1));
        let huge = dec!(300000000000000000);
        assert_eq!(super::pro_rata(huge, huge, huge * dec!(2)), dec!(150000000000000000));
    }

    #[test]
    fn non_crossing_levels_are_excluded() {
        let engine = engine(OrderSide::Sell, 8);
        engine.trade(Order::limit("b1", 1, SYMBOL, OrderSide::Buy, dec!(5), dec!(10)));
        engine.trade(Order::limit("b2", 2, SYMBOL, OrderSide::Buy, dec!(1), dec!(30)));

        let report = engine
            .trade(Order::limit("issue", 9, SYMBOL, OrderSide::Sell, dec!(2), dec!(8)))
            .into_report()
            .unwrap();
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].buy_order_no, "b1");
        assert_eq!(report.trades[0].amount, dec!(8));
        assert_eq!(report.trades[0].price, dec!(5));
    }
}
