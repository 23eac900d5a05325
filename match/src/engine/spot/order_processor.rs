//! Order Processing Module
//!
//! Runs inbound orders and cancellations through a symbol's engine, records
//! metrics for the pass and hands the results to the outbound publisher.
//! Delivery failures are logged and counted; the book is never rolled back.

use crate::engine::entry::{CancelRequest, Order, OrderType};
use crate::engine::matchlogic::{SymbolEngine, TradeOutcome};
use crate::engine::sink::OutboundPublisher;
use crate::metrics;

#[derive(Clone)]
pub struct OrderProcessor {
    publisher: OutboundPublisher,
}

impl OrderProcessor {
    pub fn new(publisher: OutboundPublisher) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &OutboundPublisher {
        &self.publisher
    }

    /// Matches `order` and publishes the pass. Ignored orders emit nothing.
    pub fn place_order(&self, engine: &SymbolEngine, order: Order) -> TradeOutcome {
        let symbol = engine.symbol();
        let outcome = metrics::record_pass(symbol, || engine.trade(order));
        match &outcome {
            TradeOutcome::Ignored(reason) => {
                log::debug!("{} order ignored: {}", symbol, reason.as_str());
                metrics::record_order(symbol, reason.as_str());
            }
            TradeOutcome::Processed(report) => {
                metrics::record_order(symbol, "processed");
                if report.has_trades() {
                    metrics::record_trades(symbol, report.trades.len());
                }
                if let Err(e) = self.publisher.publish_report(engine, report) {
                    log::error!("{} failed to publish match report: {}", symbol, e);
                    metrics::record_sink_failure(symbol);
                }
            }
        }
        outcome
    }

    /// Cancels a resting order. `None` means it was already gone.
    pub fn cancel_order(&self, engine: &SymbolEngine, request: &CancelRequest) -> Option<Order> {
        let symbol = engine.symbol();
        let cancelled = engine.cancel_order(request)?;
        let published = self
            .publisher
            .publish_cancelled(engine, vec![cancelled.clone()])
            .and_then(|_| match cancelled.order_type {
                OrderType::Limit => self.publisher.publish_depth(engine, cancelled.side),
                OrderType::Market => Ok(()),
            });
        if let Err(e) = published {
            log::error!("{} failed to publish cancellation {}: {}", symbol, cancelled.order_no, e);
            metrics::record_sink_failure(symbol);
        }
        Some(cancelled)
    }
}
