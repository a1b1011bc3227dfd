//! Workflow registry and run loop.

use retrace_core::{
    decode, encode, Clock, EngineError, RetryPolicy, RunExecution, RunInfo, WallClock,
    WorkflowError,
};
use retrace_workflow::{Context, PromiseState, PromiseStore};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

/// Type alias for boxed workflow callbacks
type WorkflowFn = Box<
    dyn Fn(Context, Vec<u8>) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, WorkflowError>> + Send>>
        + Send
        + Sync,
>;

/// In-process durable-execution engine
///
/// Workflow runs and their steps are recorded as promises in a shared
/// store; re-running a workflow (after a failure, or under the same run
/// id) replays completed steps from the store instead of executing them
/// again. Durability is scoped to the lifetime of the engine value.
pub struct Engine {
    workflows: HashMap<String, WorkflowFn>,
    store: PromiseStore,
    clock: Arc<dyn Clock>,
    workflow_retry: RetryPolicy,
    function_retry: RetryPolicy,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            workflows: HashMap::new(),
            store: PromiseStore::new(),
            clock: Arc::new(WallClock::new()),
            workflow_retry: RetryPolicy::default(),
            function_retry: RetryPolicy::default(),
        }
    }

    /// Replace the clock (tests run on virtual time)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Retry policy for whole workflow runs
    pub fn with_workflow_retry(mut self, policy: RetryPolicy) -> Self {
        self.workflow_retry = policy;
        self
    }

    /// Default retry policy for local function calls
    pub fn with_function_retry(mut self, policy: RetryPolicy) -> Self {
        self.function_retry = policy;
        self
    }

    /// Register a workflow callback under a name
    ///
    /// # Example
    /// ```ignore
    /// let mut engine = Engine::new();
    /// engine.register_workflow("greet", |_ctx, name: String| async move {
    ///     Ok(format!("Hello, {}!", name))
    /// });
    /// ```
    pub fn register_workflow<F, Fut, I, O>(&mut self, name: &str, workflow: F)
    where
        F: Fn(Context, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, WorkflowError>> + Send + 'static,
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
    {
        let boxed: WorkflowFn = Box::new(move |ctx: Context, input_bytes: Vec<u8>| -> Pin<Box<dyn Future<Output = Result<Vec<u8>, WorkflowError>> + Send>> {
            let input: I = match decode(&input_bytes) {
                Ok(i) => i,
                Err(e) => {
                    return Box::pin(async move {
                        Err(WorkflowError::Serialization(format!(
                            "Input deserialization failed: {}",
                            e
                        )))
                    })
                }
            };

            let future = workflow(ctx, input);
            Box::pin(async move {
                let output = future.await?;
                encode(&output).map_err(|e| {
                    WorkflowError::Serialization(format!("Output serialization failed: {}", e))
                })
            })
        });

        self.workflows.insert(name.to_string(), boxed);
    }

    /// Run a registered workflow under a fresh run id
    pub async fn run_workflow<I, O>(&self, name: &str, input: I) -> Result<O, EngineError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        self.run_workflow_with_id(name, &run_id, input).await
    }

    /// Run a registered workflow under an explicit run id
    ///
    /// The run itself is a promise: invoking the same run id again returns
    /// the recorded output without executing the callback.
    pub async fn run_workflow_with_id<I, O>(
        &self,
        name: &str,
        run_id: &str,
        input: I,
    ) -> Result<O, EngineError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let input_bytes =
            encode(&input).map_err(|e| EngineError::Serialization(e.to_string()))?;

        let run_promise = format!("run:{}", run_id);
        match self.store.ensure(&run_promise) {
            PromiseState::Resolved(bytes) => {
                info!("Run '{}' already completed, returning recorded output", run_id);
                return decode(&bytes).map_err(|e| EngineError::Serialization(e.to_string()));
            }
            PromiseState::Rejected(reason) => {
                return Err(WorkflowError::PromiseRejected {
                    id: run_promise,
                    reason,
                }
                .into());
            }
            PromiseState::Pending => {}
        }

        let workflow = self
            .workflows
            .get(name)
            .ok_or_else(|| EngineError::WorkflowNotRegistered(name.to_string()))?;

        let mut attempt: i32 = 1;
        loop {
            let run_info = RunInfo {
                execution: RunExecution::new(run_id, attempt),
                workflow_type: name.to_string(),
                started_at: self.clock.now(),
            };
            let ctx = Context::new(
                run_info,
                self.store.clone(),
                self.clock.clone(),
                self.function_retry.clone(),
            );

            info!("Starting workflow '{}' run '{}' (attempt {})", name, run_id, attempt);
            match workflow(ctx, input_bytes.clone()).await {
                Ok(output_bytes) => {
                    self.store.resolve(&run_promise, output_bytes.clone());
                    info!("Workflow '{}' run '{}' completed", name, run_id);
                    return decode(&output_bytes)
                        .map_err(|e| EngineError::Serialization(e.to_string()));
                }
                Err(err) => {
                    if !err.is_retryable()
                        || !self.workflow_retry.allows_retry(attempt, err.error_type())
                    {
                        warn!(
                            "Workflow '{}' run '{}' failed permanently after {} attempt(s): {}",
                            name, run_id, attempt, err
                        );
                        self.store.reject(&run_promise, err.to_string());
                        return Err(err.into());
                    }

                    let delay = self.workflow_retry.backoff(attempt);
                    warn!(
                        "Workflow '{}' run '{}' attempt {} failed: {} (retrying in {:?})",
                        name, run_id, attempt, err, delay
                    );
                    self.clock.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// The promise store backing this engine
    pub fn store(&self) -> &PromiseStore {
        &self.store
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
