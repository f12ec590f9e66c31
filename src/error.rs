//! Error conditions callers can match on.
//!
//! Orchestration code uses `anyhow` (see [`crate::Result`]); these are the conditions a stage
//! surfaces to the caller that violated a contract or ran out of time.

use thiserror::Error;

/// Result type for stream and combinator operations.
pub type FlowResult<T> = std::result::Result<T, FlowError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// A write was attempted on a stream after its writer side was closed.
    #[error("write to a closed stream")]
    Closed,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("timed out after receiving {received} of {wanted} items")]
    TimedOut { wanted: usize, received: usize },
    /// Every writer closed the stream before the reader got what it needed.
    #[error("stream ended after {received} of {wanted} items")]
    Exhausted { wanted: usize, received: usize },
}
