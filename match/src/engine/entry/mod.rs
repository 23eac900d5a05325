pub mod order;
pub mod symbol;
pub mod trade;

pub use order::{CancelRequest, Order, OrderSide, OrderStatus, OrderType};
pub use symbol::{ApportionWindow, SymbolConfig};
pub use trade::Trade;
