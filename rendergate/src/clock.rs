//! Injectable clock abstraction.
//!
//! Poll loops and deadlines suspend on real time in production but must be
//! simulatable in tests without real delay. [`Clock`] is the seam: the
//! orchestrator only ever reads time and sleeps through it. [`SystemClock`]
//! is the tokio-backed default.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Time source and sleep provider for the orchestrator.
///
/// `now` drives elapsed/deadline measurement, `now_utc` drives wall-clock
/// comparisons (quote expiry, record timestamps), and `sleep` is the
/// suspension point between polls.
pub trait Clock: Send + Sync + 'static {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;

    /// Returns the current wall-clock time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Real clock backed by `std::time` and `tokio::time`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns a shared handle to the system clock.
    pub fn shared() -> Arc<dyn Clock> {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_instants_are_monotonic() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[tokio::test]
    async fn system_clock_sleep_completes() {
        let clock = SystemClock;
        let before = clock.now();
        clock.sleep(Duration::from_millis(10)).await;
        assert!(clock.now().duration_since(before) >= Duration::from_millis(10));
    }

    #[test]
    fn shared_handle_is_usable_as_trait_object() {
        let clock = SystemClock::shared();
        let _ = clock.now_utc();
    }
}
