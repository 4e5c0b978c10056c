//! Simulated environment.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use bulletin_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall-clock origin for simulated timestamps (2024-01-01T00:00:00Z).
pub const SIM_EPOCH_SECS: f64 = 1_704_067_200.0;

/// Default seed.
pub const DEFAULT_SEED: u64 = 0x5eed;

struct SimState {
    rng: ChaCha8Rng,
    elapsed: Duration,
    sleeps: Vec<Duration>,
}

/// Deterministic [`Environment`].
///
/// Sleeping completes immediately, advances virtual time and is recorded.
/// Clones share state.
#[derive(Clone)]
pub struct SimEnv {
    origin: Instant,
    state: Arc<Mutex<SimState>>,
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }
}

impl SimEnv {
    /// Environment with the default seed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with an explicit RNG seed.
    pub fn with_seed(seed: u64) -> Self {
        let state = SimState {
            rng: ChaCha8Rng::seed_from_u64(seed),
            elapsed: Duration::ZERO,
            sleeps: Vec::new(),
        };
        Self { origin: Instant::now(), state: Arc::new(Mutex::new(state)) }
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock().sleeps.clone()
    }

    /// Virtual time elapsed.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Instant {
        self.origin + self.lock().elapsed
    }

    fn wall_clock(&self) -> f64 {
        SIM_EPOCH_SECS + self.lock().elapsed.as_secs_f64()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        {
            let mut state = self.lock();
            state.elapsed += duration;
            state.sleeps.push(duration);
        }
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }
}
