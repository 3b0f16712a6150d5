//! Matching engine error types.

use std::fmt;

/// Errors surfaced by the matching engine's public entry points.
///
/// Everything here is recovered locally by callers; bad input never stops
/// the engine.
#[derive(Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// A submitted order failed validation and was not enqueued.
    RejectedSubmission {
        /// Human-readable reason for the rejection.
        reason: String,
    },

    /// The submission queue is no longer accepting orders.
    QueueClosed,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::RejectedSubmission { reason } => {
                write!(f, "submission rejected: {reason}")
            }
            EngineError::QueueClosed => write!(f, "submission queue closed"),
        }
    }
}

impl std::error::Error for EngineError {}
