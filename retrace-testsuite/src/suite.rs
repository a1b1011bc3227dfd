//! Test environment for running workflow and function tests.

use retrace_core::{
    Clock, EngineError, FunctionError, FunctionInfo, RetryPolicy, RunExecution, SleepFuture,
};
use retrace_engine::Engine;
use retrace_workflow::{Context, FunctionContext, PromiseStore, WorkflowError};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Virtual-time clock: sleeps return immediately and advance an offset
pub struct ManualClock {
    base: chrono::DateTime<chrono::Utc>,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: chrono::Utc::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Total virtual time consumed by sleeps so far
    pub fn advanced(&self) -> Duration {
        *self.offset.lock().unwrap()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) -> SleepFuture {
        let mut offset = self.offset.lock().unwrap();
        *offset += duration;
        Box::pin(std::future::ready(()))
    }

    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        let offset = *self.offset.lock().unwrap();
        self.base + chrono::Duration::from_std(offset).unwrap_or(chrono::Duration::zero())
    }
}

/// Test environment wrapping an engine on a manual clock
///
/// Run ids are deterministic (`test-run-N`), and every sleep in workflow
/// code, function code and retry backoff is virtual.
pub struct TestEnvironment {
    engine: Engine,
    clock: Arc<ManualClock>,
    run_counter: AtomicU64,
    function_counter: AtomicU64,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new());
        let engine = Engine::new().with_clock(clock.clone());
        Self {
            engine,
            clock,
            run_counter: AtomicU64::new(0),
            function_counter: AtomicU64::new(0),
        }
    }

    /// Set the workflow-level retry policy
    pub fn with_workflow_retry(mut self, policy: RetryPolicy) -> Self {
        self.engine = self.engine.with_workflow_retry(policy);
        self
    }

    /// Set the default retry policy for local function calls
    pub fn with_function_retry(mut self, policy: RetryPolicy) -> Self {
        self.engine = self.engine.with_function_retry(policy);
        self
    }

    /// Register a workflow for testing
    pub fn register_workflow<F, Fut, I, O>(&mut self, name: &str, workflow: F)
    where
        F: Fn(Context, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, WorkflowError>> + Send + 'static,
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        self.engine.register_workflow(name, workflow);
    }

    /// Execute a registered workflow under a fresh deterministic run id
    pub async fn execute_workflow<I, O>(&self, name: &str, input: I) -> Result<O, EngineError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let run_id = format!("test-run-{}", self.run_counter.fetch_add(1, Ordering::SeqCst));
        self.engine.run_workflow_with_id(name, &run_id, input).await
    }

    /// Execute a registered workflow under an explicit run id
    pub async fn execute_workflow_with_id<I, O>(
        &self,
        name: &str,
        run_id: &str,
        input: I,
    ) -> Result<O, EngineError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        self.engine.run_workflow_with_id(name, run_id, input).await
    }

    /// Execute a function directly with a synthetic context (no retries)
    pub async fn execute_function<F, Fut, I, O>(&self, func: F, input: I) -> Result<O, FunctionError>
    where
        F: Fn(FunctionContext, I) -> Fut,
        Fut: Future<Output = Result<O, FunctionError>>,
    {
        let seq = self.function_counter.fetch_add(1, Ordering::SeqCst);
        let info = FunctionInfo {
            function_id: format!("test-fn-{}", seq),
            run: RunExecution::new("test-run", 1),
            attempt: 1,
            scheduled_time: self.clock.now(),
            started_time: self.clock.now(),
        };
        let ctx = FunctionContext::new(info, self.clock.clone());
        func(ctx, input).await
    }

    /// The manual clock driving this environment
    pub fn clock(&self) -> &Arc<ManualClock> {
        &self.clock
    }

    /// The promise store backing the engine
    pub fn store(&self) -> &PromiseStore {
        self.engine.store()
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_and_execute_workflow() {
        let mut env = TestEnvironment::new();
        env.register_workflow("greet", |_ctx, name: String| async move {
            Ok(format!("Hello, {}!", name))
        });

        let result: String = env
            .execute_workflow("greet", "World".to_string())
            .await
            .unwrap();
        assert_eq!(result, "Hello, World!");
    }

    #[tokio::test]
    async fn execute_function_directly() {
        let env = TestEnvironment::new();

        async fn double(_ctx: FunctionContext, n: i32) -> Result<i32, FunctionError> {
            Ok(n * 2)
        }

        let result = env.execute_function(double, 21).await.unwrap();
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn sleeps_are_virtual() {
        let mut env = TestEnvironment::new();
        env.register_workflow("sleepy", |ctx: Context, _input: ()| async move {
            ctx.sleep(Duration::from_secs(3600)).await;
            Ok(())
        });

        let before = std::time::Instant::now();
        env.execute_workflow::<_, ()>("sleepy", ()).await.unwrap();
        assert!(before.elapsed() < Duration::from_secs(1));
        assert_eq!(env.clock().advanced(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn backoff_consumes_virtual_time_per_schedule() {
        use std::sync::atomic::AtomicUsize;

        static CALLS: AtomicUsize = AtomicUsize::new(0);

        async fn fails_three_times(
            _ctx: FunctionContext,
            _input: (),
        ) -> Result<i32, FunctionError> {
            if CALLS.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(FunctionError::Failed("transient".into()))
            } else {
                Ok(1)
            }
        }

        let mut env = TestEnvironment::new().with_function_retry(RetryPolicy {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(100),
            maximum_attempts: 0,
            non_retryable_error_types: vec![],
        });
        env.register_workflow("retrying", |ctx: Context, _input: ()| async move {
            let out: i32 = ctx.lfc(fails_three_times, ()).await?;
            Ok(out)
        });

        let out: i32 = env.execute_workflow("retrying", ()).await.unwrap();
        assert_eq!(out, 1);
        // Three failed attempts: 1s + 2s + 4s of backoff
        assert_eq!(env.clock().advanced(), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn deterministic_run_ids() {
        let mut env = TestEnvironment::new();
        env.register_workflow("run_id", |ctx: Context, _input: ()| async move {
            Ok(ctx.run_info().execution.run_id.clone())
        });

        let first: String = env.execute_workflow("run_id", ()).await.unwrap();
        let second: String = env.execute_workflow("run_id", ()).await.unwrap();
        assert_eq!(first, "test-run-0");
        assert_eq!(second, "test-run-1");
    }
}
