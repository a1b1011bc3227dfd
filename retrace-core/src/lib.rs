//! Core types and utilities for the retrace durable-execution SDK.
//!
//! This crate provides the foundational types, error handling, clock
//! abstraction and serialization framework used throughout retrace.

pub mod clock;
pub mod encoded;
pub mod error;
pub mod types;

pub use clock::*;
pub use encoded::*;
pub use error::*;
pub use types::*;
