//! Outbound Event Sink
//!
//! The engines never perform I/O. After each pass the publisher turns the
//! [`MatchReport`] into events and hands them to an [`EventSink`]; a delivery
//! failure is reported to the caller but never undoes the book mutation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::engine::data::DepthSnapshot;
use crate::engine::entry::{Order, OrderSide, Trade};
use crate::engine::matchlogic::{MatchReport, SymbolEngine};
use crate::error::SinkError;

pub const DEFAULT_MAX_TRADE_BATCH: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    Trades { symbol: String, trades: Vec<Trade> },
    Completed { symbol: String, orders: Vec<Order> },
    Cancelled { symbol: String, orders: Vec<Order> },
    Depth(DepthSnapshot),
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: OutboundEvent) -> Result<(), SinkError>;
}

/// Forwards events into an unbounded tokio channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<OutboundEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn publish(&self, event: OutboundEvent) -> Result<(), SinkError> {
        self.tx.send(event).map_err(|_| SinkError::Closed)
    }
}

/// Writes every event to the log as a JSON line
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: OutboundEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(&event)?;
        log::info!("{}", line);
        Ok(())
    }
}

/// Sink used by the binary: events go to the log when `log_events` is set,
/// otherwise into a channel whose receiver is returned to the caller.
pub fn event_sink(log_events: bool) -> (Arc<dyn EventSink>, Option<UnboundedReceiver<OutboundEvent>>) {
    if log_events {
        (Arc::new(LogSink), None)
    } else {
        let (sink, rx) = ChannelSink::new();
        (Arc::new(sink), Some(rx))
    }
}

/// Turns matching results into sink events
#[derive(Clone)]
pub struct OutboundPublisher {
    sink: Arc<dyn EventSink>,
    max_trade_batch: usize,
}

impl OutboundPublisher {
    pub fn new(sink: Arc<dyn EventSink>, max_trade_batch: usize) -> Self {
        Self {
            sink,
            max_trade_batch: max_trade_batch.max(1),
        }
    }

    pub fn max_trade_batch(&self) -> usize {
        self.max_trade_batch
    }

    /// Publishes trades in chunks of at most `max_trade_batch`, then the
    /// completed orders, then a snapshot of each mutated depth side.
    pub fn publish_report(&self, engine: &SymbolEngine, report: &MatchReport) -> Result<(), SinkError> {
        let symbol = engine.symbol();
        for chunk in report.trades.chunks(self.max_trade_batch) {
            self.sink.publish(OutboundEvent::Trades {
                symbol: symbol.to_string(),
                trades: chunk.to_vec(),
            })?;
        }
        if !report.completed.is_empty() {
            self.sink.publish(OutboundEvent::Completed {
                symbol: symbol.to_string(),
                orders: report.completed.clone(),
            })?;
        }
        for side in &report.depth_changed {
            self.publish_depth(engine, *side)?;
        }
        Ok(())
    }

    pub fn publish_cancelled(&self, engine: &SymbolEngine, orders: Vec<Order>) -> Result<(), SinkError> {
        if orders.is_empty() {
            return Ok(());
        }
        self.sink.publish(OutboundEvent::Cancelled {
            symbol: engine.symbol().to_string(),
            orders,
        })
    }

    pub fn publish_depth(&self, engine: &SymbolEngine, side: OrderSide) -> Result<(), SinkError> {
        self.sink
            .publish(OutboundEvent::Depth(engine.depth(side).snapshot(engine.symbol())))
    }
}
