//! Durable local function calls.
//!
//! `LocalFunctionCall` is the builder returned by `Context::lfc`. It
//! carries the function, its input and the promise id backing the
//! invocation, and implements `IntoFuture` so it can be awaited directly
//! or after attaching options with `with_options`.

use crate::function::FunctionContext;
use crate::promise::{PromiseState, PromiseStore};
use retrace_core::{
    decode, encode, Clock, FunctionError, FunctionInfo, InvocationOptions, RetryPolicy,
    RunExecution, WorkflowError,
};
use serde::{de::DeserializeOwned, Serialize};
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

/// A durable local function call, awaiting execution
pub struct LocalFunctionCall<F, Fut, I> {
    func: F,
    input: I,
    promise_id: String,
    options: InvocationOptions,
    run: RunExecution,
    store: PromiseStore,
    clock: Arc<dyn Clock>,
    default_retry: RetryPolicy,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut, I> LocalFunctionCall<F, Fut, I> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        func: F,
        input: I,
        promise_id: String,
        run: RunExecution,
        store: PromiseStore,
        clock: Arc<dyn Clock>,
        default_retry: RetryPolicy,
    ) -> Self {
        Self {
            func,
            input,
            promise_id,
            options: InvocationOptions::default(),
            run,
            store,
            clock,
            default_retry,
            _marker: PhantomData,
        }
    }

    /// Attach invocation options (promise id, retry policy override)
    pub fn with_options(mut self, options: InvocationOptions) -> Self {
        if let Some(id) = &options.promise_id {
            self.promise_id = id.clone();
        }
        self.options = options;
        self
    }

    /// Shorthand for overriding just the promise id
    pub fn with_promise_id(self, id: impl Into<String>) -> Self {
        let options = InvocationOptions {
            promise_id: Some(id.into()),
            ..self.options.clone()
        };
        self.with_options(options)
    }

    /// The promise id this call will execute under
    pub fn promise_id(&self) -> &str {
        &self.promise_id
    }
}

impl<F, Fut, I, O> LocalFunctionCall<F, Fut, I>
where
    F: Fn(FunctionContext, I) -> Fut + Send + 'static,
    Fut: Future<Output = Result<O, FunctionError>> + Send + 'static,
    I: Clone + Send + 'static,
    O: Serialize + DeserializeOwned + Send + 'static,
{
    async fn execute(self) -> Result<O, WorkflowError> {
        // Cached outcome first: completed promises are immutable.
        match self.store.ensure(&self.promise_id) {
            PromiseState::Resolved(bytes) => {
                debug!("Promise '{}' already resolved, replaying cached result", self.promise_id);
                return decode(&bytes).map_err(|e| WorkflowError::Serialization(e.to_string()));
            }
            PromiseState::Rejected(reason) => {
                debug!("Promise '{}' already rejected, replaying failure", self.promise_id);
                return Err(WorkflowError::PromiseRejected {
                    id: self.promise_id,
                    reason,
                });
            }
            PromiseState::Pending => {}
        }

        let policy = self
            .options
            .retry_policy
            .clone()
            .unwrap_or_else(|| self.default_retry.clone());
        let scheduled_time = self.clock.now();
        let mut attempt: i32 = 1;

        loop {
            let info = FunctionInfo {
                function_id: self.promise_id.clone(),
                run: self.run.clone(),
                attempt,
                scheduled_time,
                started_time: self.clock.now(),
            };
            let fctx = FunctionContext::new(info, self.clock.clone());

            match (self.func)(fctx, self.input.clone()).await {
                Ok(value) => {
                    let bytes = encode(&value)
                        .map_err(|e| WorkflowError::Serialization(e.to_string()))?;
                    self.store.resolve(&self.promise_id, bytes);
                    debug!("Promise '{}' resolved on attempt {}", self.promise_id, attempt);
                    return Ok(value);
                }
                Err(err) => {
                    if !err.is_retryable() || !policy.allows_retry(attempt, err.error_type()) {
                        warn!(
                            "Promise '{}' rejected after {} attempt(s): {}",
                            self.promise_id, attempt, err
                        );
                        self.store.reject(&self.promise_id, err.to_string());
                        return Err(WorkflowError::FunctionFailed(err.to_string()));
                    }

                    let delay = policy.backoff(attempt);
                    warn!(
                        "Promise '{}' attempt {} failed: {} (retrying in {:?})",
                        self.promise_id, attempt, err, delay
                    );
                    self.clock.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl<F, Fut, I, O> IntoFuture for LocalFunctionCall<F, Fut, I>
where
    F: Fn(FunctionContext, I) -> Fut + Send + 'static,
    Fut: Future<Output = Result<O, FunctionError>> + Send + 'static,
    I: Clone + Send + 'static,
    O: Serialize + DeserializeOwned + Send + 'static,
{
    type Output = Result<O, WorkflowError>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
