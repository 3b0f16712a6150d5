//! Contract-violation errors for order construction and fill accounting.

use std::fmt;

/// Errors raised by order construction and mutation.
///
/// These are contract violations in the sense of the error taxonomy: a
/// failing operation surfaces the error to the caller and leaves the order
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum OrderError {
    /// Quantity was zero where a positive quantity is required.
    InvalidQuantity {
        /// The offending quantity.
        quantity: u64,
    },

    /// A price could not be constructed or parsed as a positive decimal.
    InvalidPrice {
        /// The textual form of the rejected input.
        input: String,
    },

    /// A required identifier field was empty.
    EmptyField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// A side string did not parse as `BUY` or `SELL`.
    UnknownSide {
        /// The rejected input.
        input: String,
    },

    /// A fill was requested for more than the order's remaining quantity.
    Overfill {
        /// Quantity requested by the fill.
        requested: u64,
        /// Remaining quantity on the order.
        remaining: u64,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::InvalidQuantity { quantity } => {
                write!(f, "invalid quantity: {quantity} (must be positive)")
            }
            OrderError::InvalidPrice { input } => {
                write!(f, "invalid price: {input:?} (must be a positive decimal)")
            }
            OrderError::EmptyField { field } => {
                write!(f, "empty field: {field}")
            }
            OrderError::UnknownSide { input } => {
                write!(f, "unknown side: {input:?} (expected BUY or SELL)")
            }
            OrderError::Overfill {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "overfill: requested {requested} but only {remaining} remaining"
                )
            }
        }
    }
}

impl std::error::Error for OrderError {}
