//! Error types
//!
//! Business-rule rejections never surface here: the matching hot path reports
//! them through [`TradeOutcome`](crate::engine::matchlogic::TradeOutcome).
//! These errors cover configuration, command decoding and event delivery.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to decode command: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("symbol {0} does not exist")]
    UnknownSymbol(String),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Delivery failures of the outbound event sink
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("event sink closed")]
    Closed,

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}
