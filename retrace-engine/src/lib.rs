//! In-process durable-execution engine for retrace.
//!
//! This crate hosts workflow callbacks: registration, the run loop with
//! workflow-level retries, and resume-from-store replay of completed
//! steps.

pub mod engine;

pub use engine::*;
