//! Workflow context and core functions for authoring workflow callbacks.
//!
//! This module provides the main API for implementing workflows:
//! invoking durable local function calls, sleeping and reading run
//! information.

use crate::call::LocalFunctionCall;
use crate::function::FunctionContext;
use crate::promise::PromiseStore;
use retrace_core::{Clock, RetryPolicy, RunInfo};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Workflow context for executing workflow logic
#[derive(Clone)]
pub struct Context {
    run_info: RunInfo,
    store: PromiseStore,
    clock: Arc<dyn Clock>,
    sequence: Arc<AtomicU64>,
    default_retry: RetryPolicy,
}

impl Context {
    pub fn new(
        run_info: RunInfo,
        store: PromiseStore,
        clock: Arc<dyn Clock>,
        default_retry: RetryPolicy,
    ) -> Self {
        Self {
            run_info,
            store,
            clock,
            sequence: Arc::new(AtomicU64::new(0)),
            default_retry,
        }
    }

    /// Get run information
    pub fn run_info(&self) -> &RunInfo {
        &self.run_info
    }

    // Auto promise ids depend only on call order within the run, so a
    // re-run of the same callback maps each call onto the same promise.
    fn next_promise_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{}.{}", self.run_info.execution.run_id, seq)
    }

    /// Invoke a function as a durable local function call
    ///
    /// The call executes under the active retry policy and its result is
    /// recorded in the promise store. Awaiting a promise id that already
    /// resolved returns the stored result without executing the function.
    ///
    /// # Example
    /// ```ignore
    /// let content: String = ctx.lfc(download, url).await?;
    /// let summary: String = ctx
    ///     .lfc(summarize, content)
    ///     .with_options(InvocationOptions::new().promise_id("summary"))
    ///     .await?;
    /// ```
    pub fn lfc<F, Fut, I>(&self, func: F, input: I) -> LocalFunctionCall<F, Fut, I>
    where
        F: Fn(FunctionContext, I) -> Fut,
        Fut: Future,
    {
        LocalFunctionCall::new(
            func,
            input,
            self.next_promise_id(),
            self.run_info.execution.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.default_retry.clone(),
        )
    }

    /// Sleep for a duration
    ///
    /// Not a durable timer: a re-run sleeps again.
    pub async fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration).await;
    }

    /// Current time
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// The promise store backing this run
    pub fn store(&self) -> &PromiseStore {
        &self.store
    }
}

/// Convenience result type for workflow callbacks
pub type WorkflowResult<T> = Result<T, retrace_core::WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;
    use retrace_core::{FunctionError, RunExecution, WallClock};

    fn test_context(run_id: &str) -> Context {
        Context::new(
            RunInfo {
                execution: RunExecution::new(run_id, 1),
                workflow_type: "test".to_string(),
                started_at: chrono::Utc::now(),
            },
            PromiseStore::new(),
            Arc::new(WallClock::new()),
            RetryPolicy::default(),
        )
    }

    async fn echo(_ctx: FunctionContext, input: String) -> Result<String, FunctionError> {
        Ok(input)
    }

    #[tokio::test]
    async fn auto_promise_ids_follow_call_order() {
        let ctx = test_context("run-1");
        let first = ctx.lfc(echo, "a".to_string());
        let second = ctx.lfc(echo, "b".to_string());
        assert_eq!(first.promise_id(), "run-1.0");
        assert_eq!(second.promise_id(), "run-1.1");
    }

    #[tokio::test]
    async fn lfc_awaits_to_typed_result() {
        let ctx = test_context("run-2");
        let out: String = ctx.lfc(echo, "hello".to_string()).await.unwrap();
        assert_eq!(out, "hello");
    }
}
