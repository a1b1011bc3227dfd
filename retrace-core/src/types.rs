//! Core types for retrace.
//!
//! This module defines the main types used throughout the SDK for
//! durable invocations, retries and run identification.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for durable function invocations and workflow runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Initial retry interval
    pub initial_interval: Duration,
    /// Backoff coefficient (e.g., 2.0 for exponential)
    pub backoff_coefficient: f64,
    /// Maximum retry interval
    pub maximum_interval: Duration,
    /// Maximum number of attempts (0 means unlimited)
    pub maximum_attempts: i32,
    /// Non-retryable error types
    pub non_retryable_error_types: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(100),
            maximum_attempts: 0, // Unlimited
            non_retryable_error_types: vec![],
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the attempt following `attempt` (1-based)
    pub fn backoff(&self, attempt: i32) -> Duration {
        let exponent = (attempt - 1).max(0);
        let max = self.maximum_interval.as_secs_f64();
        // Clamp before converting; the uncapped value can overflow f64
        let secs = (self.initial_interval.as_secs_f64()
            * self.backoff_coefficient.powi(exponent))
        .min(max);
        Duration::from_secs_f64(secs.max(0.0))
    }

    /// Whether another attempt is allowed after `attempt` failed with `error_type`
    pub fn allows_retry(&self, attempt: i32, error_type: &str) -> bool {
        if self.maximum_attempts > 0 && attempt >= self.maximum_attempts {
            return false;
        }
        !self
            .non_retryable_error_types
            .iter()
            .any(|t| t == error_type)
    }
}

/// Options attached to a single durable invocation
///
/// The promise id is an idempotency identifier: two invocations sharing an
/// id share one durable result, and only the first one executes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationOptions {
    /// Explicit promise id (auto-assigned from the run sequence if absent)
    pub promise_id: Option<String>,
    /// Retry policy override for this invocation
    pub retry_policy: Option<RetryPolicy>,
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn promise_id(mut self, id: impl Into<String>) -> Self {
        self.promise_id = Some(id.into());
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }
}

/// Workflow run identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunExecution {
    pub run_id: String,
    pub attempt: i32,
}

impl RunExecution {
    pub fn new(run_id: impl Into<String>, attempt: i32) -> Self {
        Self {
            run_id: run_id.into(),
            attempt,
        }
    }
}

/// Workflow run information available in the workflow context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub execution: RunExecution,
    pub workflow_type: String,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// Information about one durable function invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    /// Promise id backing this invocation
    pub function_id: String,
    pub run: RunExecution,
    pub attempt: i32,
    pub scheduled_time: chrono::DateTime<chrono::Utc>,
    pub started_time: chrono::DateTime<chrono::Utc>,
}
