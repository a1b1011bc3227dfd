//! Clock abstraction.
//!
//! Sleeps inside workflows, functions and retry backoff all go through a
//! `Clock` so tests can run on virtual time.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Future returned by `Clock::sleep`
pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Time source for workflow execution
pub trait Clock: Send + Sync {
    /// Sleep for a duration
    fn sleep(&self, duration: Duration) -> SleepFuture;

    /// Current time
    fn now(&self) -> chrono::DateTime<chrono::Utc>;
}

/// Real clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl WallClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for WallClock {
    fn sleep(&self, duration: Duration) -> SleepFuture {
        Box::pin(tokio::time::sleep(duration))
    }

    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}
