//! Match Engine Module
//!
//! This module contains the core components of the matching engine system:
//! - `data`: Price levels, the per-symbol order book and depth views
//! - `entry`: Order, trade and symbol configuration types
//! - `matchengine`: Command model and dispatcher in front of the engines
//! - `matchlogic`: Per-symbol matching algorithms
//! - `sink`: Outbound events and their publication
//! - `spot`: Engine registry and order processing glue

pub mod data;
pub mod entry;
pub mod matchengine;
pub mod matchlogic;
pub mod sink;
pub mod spot;
