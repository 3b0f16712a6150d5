//! Core domain primitives: identifiers, sides, fixed-point prices, and the
//! order lifecycle state machine.

mod error;
mod id;
mod order;
mod price;
mod side;

pub use error::OrderError;
pub use id::OrderId;
pub use order::{Fill, Order, OrderStatus};
pub use price::{PRICE_SCALE, Price};
pub use side::Side;
