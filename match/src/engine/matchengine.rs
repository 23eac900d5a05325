//! Match Engine Module
//!
//! Decodes inbound JSON commands and routes them to the per-symbol engines.
//! Order traffic for one symbol is expected to arrive serialized; the
//! dispatcher itself keeps no ordering state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::entry::{CancelRequest, Order};
use super::matchlogic::{SymbolEngine, TradeOutcome};
use super::spot::{EngineRegistry, OrderProcessor};
use crate::error::MatchError;

/// Commands accepted by [`MatchEngine::on_message`]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum MatchCmd {
    PlaceOrder { order: Order },
    CancelOrder { cancel: CancelRequest },
    HaltSymbol { symbol: String },
    ResumeSymbol { symbol: String },
    MarkReady { symbol: String },
    RemoveSymbol { symbol: String },
}

pub struct MatchEngine {
    registry: Arc<EngineRegistry>,
    processor: OrderProcessor,
}

impl MatchEngine {
    pub fn new(registry: Arc<EngineRegistry>, processor: OrderProcessor) -> MatchEngine {
        MatchEngine {
            registry,
            processor,
        }
    }

    pub fn registry(&self) -> &Arc<EngineRegistry> {
        &self.registry
    }

    /// Decodes one serialized command and applies it
    pub fn on_message(&self, data: &[u8]) -> Result<(), MatchError> {
        log::debug!("on_message: len {}", data.len());
        let cmd: MatchCmd = serde_json::from_slice(data)?;
        self.apply(cmd)
    }

    pub fn apply(&self, cmd: MatchCmd) -> Result<(), MatchError> {
        match cmd {
            MatchCmd::PlaceOrder { order } => {
                self.place_order(order);
            }
            MatchCmd::CancelOrder { cancel } => {
                let engine = self.registry.get_engine(&cancel.symbol);
                if self.processor.cancel_order(&engine, &cancel).is_none() {
                    log::debug!("{} cancel {} found nothing", cancel.symbol, cancel.order_no);
                }
            }
            MatchCmd::HaltSymbol { symbol } => self.existing(&symbol)?.halt(),
            MatchCmd::ResumeSymbol { symbol } => self.existing(&symbol)?.resume(),
            MatchCmd::MarkReady { symbol } => {
                self.registry.get_engine(&symbol).set_ready(true);
                log::info!("{} marked ready", symbol);
            }
            MatchCmd::RemoveSymbol { symbol } => {
                self.registry
                    .remove_engine(&symbol)
                    .ok_or_else(|| MatchError::UnknownSymbol(symbol.clone()))?;
            }
        }
        Ok(())
    }

    /// Routes an order to its engine. Symbols that are not ready yet are
    /// skipped here; the engine only gates on its halt flag.
    pub fn place_order(&self, order: Order) -> Option<TradeOutcome> {
        let engine = self.registry.get_engine(&order.symbol);
        if !engine.is_ready() {
            log::warn!(
                "{} not ready, order {} skipped",
                order.symbol,
                order.order_no
            );
            return None;
        }
        Some(self.processor.place_order(&engine, order))
    }

    fn existing(&self, symbol: &str) -> Result<Arc<SymbolEngine>, MatchError> {
        self.registry
            .engine(symbol)
            .ok_or_else(|| MatchError::UnknownSymbol(symbol.to_string()))
    }
}
