//! Environment abstraction for deterministic testing.
//!
//! The `Environment` trait decouples session logic from system resources
//! (time, sleeping, randomness). Production code uses the system clock and OS
//! entropy; tests use a seeded RNG and a virtual clock so every run of a
//! scenario produces the same requests.
//!
//! # Invariants
//!
//! - Monotonicity: `env.now()` must never go backwards
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Isolation: Implementations must not share global state

use std::time::{Duration, Instant};

/// Abstract environment providing time, randomness, and sleeping.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current monotonic time.
    fn now(&self) -> Instant;

    /// Wall-clock seconds since the Unix epoch.
    ///
    /// Stamped on requests for information only; it carries no causal
    /// meaning and may jump.
    fn wall_clock(&self) -> f64;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code pauses; the session state machine never sleeps.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Picks an index in `0..len`. Returns `None` when `len` is zero.
    #[allow(clippy::cast_possible_truncation)]
    fn random_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.random_u64() % len as u64) as usize)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct CountingEnv {
        next: Arc<AtomicU8>,
    }

    impl Environment for CountingEnv {
        fn now(&self) -> Instant {
            Instant::now()
        }

        fn wall_clock(&self) -> f64 {
            0.0
        }

        fn sleep(&self, _duration: Duration) -> impl std::future::Future<Output = ()> + Send {
            std::future::ready(())
        }

        fn random_bytes(&self, buffer: &mut [u8]) {
            for byte in buffer.iter_mut() {
                *byte = self.next.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    #[test]
    fn random_index_of_empty_is_none() {
        assert_eq!(CountingEnv::default().random_index(0), None);
    }

    #[test]
    fn random_index_in_range() {
        let env = CountingEnv::default();
        for len in 1..50 {
            let index = env.random_index(len);
            assert!(matches!(index, Some(i) if i < len));
        }
    }

    #[test]
    fn random_u64_is_big_endian_of_bytes() {
        let env = CountingEnv::default();
        assert_eq!(env.random_u64(), u64::from_be_bytes([0, 1, 2, 3, 4, 5, 6, 7]));
    }
}
