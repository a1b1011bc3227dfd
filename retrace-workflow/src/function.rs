//! Function context for durable function invocations.
//!
//! This is the first argument handed to functions invoked through
//! `Context::lfc`, carrying per-attempt information and a clock.

use retrace_core::{Clock, FunctionInfo};
use std::sync::Arc;
use std::time::Duration;

/// Context for executing a durable function
#[derive(Clone)]
pub struct FunctionContext {
    info: FunctionInfo,
    clock: Arc<dyn Clock>,
}

impl FunctionContext {
    pub fn new(info: FunctionInfo, clock: Arc<dyn Clock>) -> Self {
        Self { info, clock }
    }

    /// Get invocation information (promise id, attempt, timestamps)
    pub fn info(&self) -> &FunctionInfo {
        &self.info
    }

    /// Sleep for a duration
    pub async fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration).await;
    }

    /// Current time
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }
}
