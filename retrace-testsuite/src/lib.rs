//! Testing framework for retrace workflows and functions.
//!
//! This crate provides a manual clock and a test environment for running
//! workflows deterministically and instantly, without real sleeping.

pub mod suite;

pub use suite::*;

/// Initialize tracing for tests (doesn't panic if already initialized).
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();
}
