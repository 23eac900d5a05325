use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

use spot_match::engine::entry::{
    ApportionWindow, CancelRequest, Order, OrderSide, OrderStatus, SymbolConfig,
};
use spot_match::engine::matchlogic::{IgnoreReason, SymbolEngine, TradeOutcome};
use spot_match::engine::sink::{ChannelSink, OutboundEvent, OutboundPublisher};
use spot_match::engine::spot::{EngineRegistry, OrderProcessor};

const SYMBOL: &str = "BTCUSDT";

fn engine() -> SymbolEngine {
    SymbolEngine::new(SymbolConfig::new(SYMBOL))
}

fn sell(no: &str, price: Decimal, amount: Decimal) -> Order {
    Order::limit(no, 1, SYMBOL, OrderSide::Sell, price, amount)
}

fn buy(no: &str, price: Decimal, amount: Decimal) -> Order {
    Order::limit(no, 2, SYMBOL, OrderSide::Buy, price, amount)
}

#[test]
fn price_then_time_priority() {
    let engine = engine();
    engine.trade(sell("s100a", dec!(100), dec!(1)));
    engine.trade(sell("s101", dec!(101), dec!(1)));
    engine.trade(sell("s100b", dec!(100), dec!(1)));

    let outcome = engine.trade(buy("b", dec!(101), dec!(2.5)));
    let sellers: Vec<_> = outcome.trades().iter().map(|t| t.sell_order_no.clone()).collect();
    assert_eq!(sellers, vec!["s100a", "s100b", "s101"]);
    assert_eq!(engine.book().get_order("s101").unwrap().remaining(), dec!(0.5));
}

#[test]
fn partial_fill_of_resting_sell() {
    let engine = engine();
    engine.trade(sell("s", dec!(100), dec!(1.0)));
    let report = engine
        .trade(buy("b", dec!(100), dec!(0.4)))
        .into_report()
        .unwrap();

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].price, dec!(100));
    assert_eq!(report.trades[0].amount, dec!(0.4));
    let resting = engine.book().get_order("s").unwrap();
    assert_eq!(resting.status, OrderStatus::PartiallyFilled);
    assert_eq!(resting.filled_amount, dec!(0.4));
    let incoming = report.completed.iter().find(|o| o.order_no == "b").unwrap();
    assert_eq!(incoming.status, OrderStatus::Filled);
}

#[test]
fn same_price_orders_fill_in_arrival_order() {
    let engine = engine();
    engine.trade(sell("s1", dec!(100), dec!(0.3)));
    engine.trade(sell("s2", dec!(100), dec!(0.3)));
    let report = engine
        .trade(buy("b", dec!(100), dec!(0.5)))
        .into_report()
        .unwrap();

    let amounts: Vec<_> = report.trades.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![dec!(0.3), dec!(0.2)]);
    let first = report.completed.iter().find(|o| o.order_no == "s1").unwrap();
    assert_eq!(first.status, OrderStatus::Filled);
    let second = engine.book().get_order("s2").unwrap();
    assert_eq!(second.status, OrderStatus::PartiallyFilled);
    assert_eq!(second.filled_amount, dec!(0.2));
}

#[test]
fn traded_quantity_and_notional_are_conserved() {
    let engine = engine();
    let makers = [
        sell("s1", dec!(99.5), dec!(0.7)),
        sell("s2", dec!(100), dec!(1.3)),
        sell("s3", dec!(100.25), dec!(2)),
    ];
    for maker in makers.iter().cloned() {
        engine.trade(maker);
    }
    let report = engine
        .trade(buy("b", dec!(100.25), dec!(3)))
        .into_report()
        .unwrap();

    let traded: Decimal = report.trades.iter().map(|t| t.amount).sum();
    let money: Decimal = report.trades.iter().map(|t| t.money).sum();

    let mut after: HashMap<String, Order> = report
        .completed
        .iter()
        .cloned()
        .map(|o| (o.order_no.clone(), o))
        .collect();
    if let Some(resting) = engine.book().get_order("s3") {
        after.insert(resting.order_no.clone(), resting);
    }
    let maker_filled: Decimal = makers
        .iter()
        .filter_map(|m| after.get(&m.order_no))
        .map(|o| o.filled_amount)
        .sum();
    let maker_money: Decimal = makers
        .iter()
        .filter_map(|m| after.get(&m.order_no))
        .map(|o| o.filled_money)
        .sum();
    let taker = &after["b"];

    assert_eq!(traded, dec!(3));
    assert_eq!(maker_filled, traded);
    assert_eq!(taker.filled_amount, traded);
    assert_eq!(maker_money, money);
    assert_eq!(taker.filled_money, money);
}

#[test]
fn terminal_orders_never_change_again() {
    let engine = engine();
    let order = sell("s", dec!(100), dec!(1));
    let request = CancelRequest::from(&order);
    engine.trade(order);
    let cancelled = engine.cancel_order(&request).unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let outcome = engine.trade(buy("b", dec!(100), dec!(1)));
    assert!(outcome.trades().is_empty());

    let mut filled = cancelled.clone();
    assert!(!filled.fill(dec!(1), dec!(100)));
    assert_eq!(filled.filled_amount, Decimal::ZERO);

    // re-submitting a terminal order is a no-op
    let resubmitted = engine.trade(cancelled);
    assert!(matches!(
        resubmitted,
        TradeOutcome::Ignored(IgnoreReason::NothingToFill)
    ));
}

#[test]
fn depth_view_is_bounded_and_merged() {
    let engine = SymbolEngine::new(SymbolConfig::new(SYMBOL).with_max_depth(3));
    for (i, price) in [dec!(105), dec!(101), dec!(103), dec!(102), dec!(104)].iter().enumerate() {
        engine.trade(sell(&format!("s{i}"), *price, dec!(1)));
    }
    engine.trade(sell("dup", dec!(101), dec!(2)));

    let entries = engine.depth(OrderSide::Sell).entries();
    assert_eq!(entries.len(), 3);
    let prices: Vec<_> = entries.iter().map(|e| e.price).collect();
    assert_eq!(prices, vec![dec!(101), dec!(102), dec!(103)]);
    assert_eq!(entries[0].amount, dec!(3));
    assert_eq!(engine.book().level_count(OrderSide::Sell), 5);
}

#[test]
fn cancelling_twice_removes_once() {
    let engine = engine();
    let order = buy("b", dec!(100), dec!(1));
    let request = CancelRequest::from(&order);
    engine.trade(order);

    assert!(engine.cancel_order(&request).is_some());
    assert!(engine.cancel_order(&request).is_none());
    assert_eq!(engine.depth(OrderSide::Buy).depth(), 0);
}

#[test]
fn apportioned_buy_splits_across_asks() {
    let window = ApportionWindow::new(Utc::now() + Duration::hours(1), OrderSide::Buy);
    let engine = SymbolEngine::new(SymbolConfig::new(SYMBOL).with_apportion(window));
    engine.trade(sell("s1", dec!(1), dec!(10)));
    engine.trade(sell("s2", dec!(1), dec!(30)));

    let report = engine
        .trade(buy("sub", dec!(1), dec!(8)))
        .into_report()
        .unwrap();
    let allocations: Vec<_> = report
        .trades
        .iter()
        .map(|t| (t.sell_order_no.as_str(), t.amount))
        .collect();
    assert_eq!(allocations, vec![("s1", dec!(2)), ("s2", dec!(6))]);
    assert!(report.resting.is_none());
}

#[test]
fn halted_symbol_produces_nothing() {
    let engine = engine();
    engine.trade(sell("s", dec!(100), dec!(1)));
    engine.halt();

    let outcome = engine.trade(buy("b", dec!(100), dec!(1)));
    assert!(matches!(outcome, TradeOutcome::Ignored(IgnoreReason::Halted)));
    assert!(outcome.trades().is_empty());
    assert_eq!(engine.book().get_order("s").unwrap().filled_amount, Decimal::ZERO);
    assert_eq!(engine.book().get_best_bid(), None);
}

#[test]
fn engines_for_different_symbols_run_in_parallel() {
    let (sink, mut rx) = ChannelSink::new();
    let processor = OrderProcessor::new(OutboundPublisher::new(Arc::new(sink), 10));
    let registry = Arc::new(EngineRegistry::new());

    let handles: Vec<_> = ["AAAUSDT", "BBBUSDT", "CCCUSDT"]
        .into_iter()
        .map(|symbol| {
            let registry = registry.clone();
            let processor = processor.clone();
            std::thread::spawn(move || {
                let engine = registry.get_engine(symbol);
                for i in 0..50 {
                    let no = format!("s{i}");
                    processor.place_order(
                        &engine,
                        Order::limit(no, 1, symbol, OrderSide::Sell, dec!(10), dec!(1)),
                    );
                }
                processor.place_order(
                    &engine,
                    Order::limit("b", 2, symbol, OrderSide::Buy, dec!(10), dec!(50)),
                )
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().trades().len(), 50);
    }
    assert_eq!(registry.len(), 3);

    let mut trades = 0;
    while let Ok(event) = rx.try_recv() {
        if let OutboundEvent::Trades { trades: batch, .. } = event {
            assert!(batch.len() <= 10);
            trades += batch.len();
        }
    }
    assert_eq!(trades, 150);
}
