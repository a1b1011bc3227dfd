//! Workflow authoring SDK for retrace.
//!
//! This crate provides the API for implementing workflow callbacks:
//! the workflow context, durable local function calls and the promise
//! store that backs them.

pub mod call;
pub mod context;
pub mod function;
pub mod promise;

pub use call::*;
pub use context::*;
pub use function::*;
pub use promise::*;

pub use retrace_core::{FunctionError, WorkflowError};
