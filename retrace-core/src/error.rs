//! Error types for retrace.
//!
//! This module defines the error types that can occur when executing
//! durable functions, workflow callbacks and engine operations.

use thiserror::Error;

/// Error returned by a durable function invocation
#[derive(Debug, Clone, Error)]
pub enum FunctionError {
    /// Transient failure, eligible for retry under the active policy
    #[error("Function failed: {0}")]
    Failed(String),

    /// Permanent failure, never retried
    #[error("Non-retryable failure: {0}")]
    NonRetryable(String),

    /// The function panicked
    #[error("Function panicked: {0}")]
    Panic(String),
}

impl FunctionError {
    /// Error type name matched against `RetryPolicy::non_retryable_error_types`
    pub fn error_type(&self) -> &'static str {
        match self {
            FunctionError::Failed(_) => "Failed",
            FunctionError::NonRetryable(_) => "NonRetryable",
            FunctionError::Panic(_) => "Panic",
        }
    }

    /// Whether this error is eligible for retry at all
    pub fn is_retryable(&self) -> bool {
        matches!(self, FunctionError::Failed(_))
    }
}

/// Error surfaced to workflow callbacks
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// A durable function exhausted its retries or failed permanently
    #[error("Function failed: {0}")]
    FunctionFailed(String),

    /// The promise backing an invocation was already rejected
    #[error("Promise '{id}' was rejected: {reason}")]
    PromiseRejected { id: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Generic error: {0}")]
    Generic(String),
}

impl WorkflowError {
    /// Error type name matched against `RetryPolicy::non_retryable_error_types`
    pub fn error_type(&self) -> &'static str {
        match self {
            WorkflowError::FunctionFailed(_) => "FunctionFailed",
            WorkflowError::PromiseRejected { .. } => "PromiseRejected",
            WorkflowError::Serialization(_) => "Serialization",
            WorkflowError::Generic(_) => "Generic",
        }
    }

    /// Whether re-running the workflow callback could change the outcome
    ///
    /// A rejected promise is immutable, so re-running replays the same
    /// rejection; serialization failures are deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkflowError::FunctionFailed(_) | WorkflowError::Generic(_)
        )
    }
}

/// Error returned by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Workflow '{0}' not registered")]
    WorkflowNotRegistered(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RetraceResult<T> = Result<T, EngineError>;

/// Helper functions to check error types
pub fn is_non_retryable(err: &FunctionError) -> bool {
    matches!(err, FunctionError::NonRetryable(_))
}

pub fn is_function_failed(err: &WorkflowError) -> bool {
    matches!(err, WorkflowError::FunctionFailed(_))
}

pub fn is_promise_rejected(err: &WorkflowError) -> bool {
    matches!(err, WorkflowError::PromiseRejected { .. })
}
