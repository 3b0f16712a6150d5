//! Order book error types.

use crate::types::OrderError;
use std::fmt;

/// Errors that can occur within the order book.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Error from an order-level operation (fill accounting, validation).
    Order(OrderError),

    /// An order for a different symbol was handed to this book.
    SymbolMismatch {
        /// Symbol of the book.
        book: String,
        /// Symbol of the offending order.
        order: String,
    },

    /// Error while serializing snapshot data.
    Serialization {
        /// Underlying error message.
        message: String,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::Order(err) => write!(f, "order error: {err}"),
            OrderBookError::SymbolMismatch { book, order } => {
                write!(f, "symbol mismatch: order for {order} added to {book} book")
            }
            OrderBookError::Serialization { message } => {
                write!(f, "serialization error: {message}")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}

impl From<OrderError> for OrderBookError {
    fn from(err: OrderError) -> Self {
        OrderBookError::Order(err)
    }
}
