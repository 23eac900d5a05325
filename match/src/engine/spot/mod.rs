//! Spot Market Module
//!
//! - `registry`: owns one matching engine per trading pair
//! - `order_processor`: runs orders through an engine and publishes the results

pub mod order_processor;
pub mod registry;

pub use order_processor::OrderProcessor;
pub use registry::EngineRegistry;
