//! Production environment: system time, tokio timers, OS randomness.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bulletin_core::Environment;

/// Production [`Environment`].
///
/// - `std::time::Instant::now()` for monotonic time
/// - `SystemTime` for request timestamps
/// - `tokio::time::sleep()` for pauses
/// - `getrandom` for channel, message and recipient choice
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> std::time::Instant {
        std::time::Instant::now()
    }

    fn wall_clock(&self) -> f64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).unwrap_or_else(|e| {
            // Choices degrade to the first item; nothing here is secret.
            tracing::error!("getrandom failed: {}", e);
            buffer.fill(0);
        });
    }
}
