//! Demo: download and summarize.
//!
//! A two-step workflow where each step sleeps and then fails roughly half
//! the time, so the engine's retry and resume behavior is visible.
//!
//! ## Concepts
//!
//! - **Workflow**: the callback chaining the two steps through `ctx.lfc`
//! - **Local function call**: a durable unit of work backed by a promise
//! - **Promise id**: idempotency key; a resolved id is never re-executed

pub mod activities;
pub mod workflows;

pub use activities::*;
pub use workflows::*;
