//! Invoke operations
//!
//! Operations are the asynchronous, side-effecting work behind invoke steps.
//! They:
//! - Receive the full process context
//! - Resolve with a result or reject with an [`OperationError`]
//! - Own their retry policy; the engine calls each operation once

mod definition;
mod retry;

pub(crate) use definition::{AnyOperation, ErasedOperation};
pub use definition::{from_fn, FnOperation, Operation, OperationError};
pub use retry::{RetryPolicy, Retrying};
