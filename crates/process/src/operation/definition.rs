//! Operation trait definition

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{ProcessContext, ProcessData};

/// Error type for operation failures
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationError {
    /// Error message
    pub message: String,

    /// Error type/code for programmatic handling
    pub error_type: Option<String>,

    /// Whether a retrying wrapper may try again
    ///
    /// The engine itself never retries; see [`Retrying`](super::Retrying).
    pub retryable: bool,

    /// Additional error details (for debugging)
    pub details: Option<Value>,
}

impl OperationError {
    /// Create a new non-retryable error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            retryable: false,
            details: None,
        }
    }

    /// Create a retryable error
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_type: None,
            retryable: true,
            details: None,
        }
    }

    /// Set the error type
    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    /// Add error details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for OperationError {}

impl From<anyhow::Error> for OperationError {
    fn from(err: anyhow::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// An operation is the asynchronous work performed by an invoke step
///
/// # Example
///
/// ```ignore
/// struct LookupBalance {
///     gateway: Arc<dyn ChainGateway>,
/// }
///
/// #[async_trait]
/// impl Operation<MyData> for LookupBalance {
///     type Output = u128;
///
///     fn name(&self) -> &str {
///         "lookup_balance"
///     }
///
///     async fn run(&self, ctx: &ProcessContext<MyData>) -> Result<u128, OperationError> {
///         self.gateway
///             .balance(&ctx.data.address)
///             .await
///             .map_err(|e| OperationError::new(e.to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait Operation<D: ProcessData>: Send + Sync + 'static {
    /// Result written to the invoke step's output field, if it declares one
    type Output: Serialize + Send;

    /// Name used in logs and events
    fn name(&self) -> &str;

    /// Run the operation against the current context
    async fn run(&self, ctx: &ProcessContext<D>) -> Result<Self::Output, OperationError>;
}

/// Type-erased operation interface used by invoke steps
#[async_trait]
pub(crate) trait AnyOperation<D>: Send + Sync {
    fn name(&self) -> &str;

    async fn run_json(&self, ctx: &ProcessContext<D>) -> Result<Value, OperationError>;
}

/// Wrapper to implement AnyOperation for any Operation
pub(crate) struct ErasedOperation<D: ProcessData, O: Operation<D>> {
    inner: Arc<O>,
    _data: PhantomData<fn() -> D>,
}

impl<D: ProcessData, O: Operation<D>> ErasedOperation<D, O> {
    pub(crate) fn new(inner: Arc<O>) -> Self {
        Self {
            inner,
            _data: PhantomData,
        }
    }
}

#[async_trait]
impl<D: ProcessData, O: Operation<D>> AnyOperation<D> for ErasedOperation<D, O> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run_json(&self, ctx: &ProcessContext<D>) -> Result<Value, OperationError> {
        let output = self.inner.run(ctx).await?;
        serde_json::to_value(output).map_err(|e| {
            OperationError::new(format!("failed to encode operation result: {e}"))
                .with_type("ENCODING")
        })
    }
}

/// Operation backed by an async closure over a snapshot of the context
pub struct FnOperation<F> {
    name: String,
    f: F,
}

/// Build an operation from an async closure
///
/// The closure receives a clone of the context, so it cannot mutate the
/// running instance; results flow back through the step's output field.
///
/// ```ignore
/// let op = from_fn("transfer_funds", |ctx: ProcessContext<Data>| async move {
///     if ctx.data.eoa_address.is_empty() {
///         return Err(OperationError::new("eoaAddress is not set"));
///     }
///     Ok(())
/// });
/// ```
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnOperation<F> {
    FnOperation {
        name: name.into(),
        f,
    }
}

#[async_trait]
impl<D, F, Fut, T> Operation<D> for FnOperation<F>
where
    D: ProcessData + Clone,
    F: Fn(ProcessContext<D>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, OperationError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &ProcessContext<D>) -> Result<T, OperationError> {
        (self.f)(ctx.clone()).await
    }
}
