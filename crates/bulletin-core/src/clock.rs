//! Scalar logical clock.
//!
//! # Invariants
//!
//! - Monotonicity: the value never decreases over the clock's lifetime
//! - `tick` advances by exactly one
//! - `update` jumps to the received value when it is larger and is a no-op
//!   otherwise

/// Lamport-style clock for one session.
///
/// Owned by a single session and never shared, so it needs no locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalClock {
    value: u64,
}

impl LogicalClock {
    /// Create a clock at zero.
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Advance by one and return the new value.
    ///
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn tick(&mut self) -> u64 {
        self.value = self.value.saturating_add(1);
        self.value
    }

    /// Merge a peer's clock: `value = max(value, received)`.
    pub fn update(&mut self, received: u64) {
        if received > self.value {
            self.value = received;
        }
    }

    /// Current value.
    pub fn get(&self) -> u64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone)]
    enum ClockOp {
        Tick,
        Update(u64),
    }

    fn clock_op() -> impl Strategy<Value = ClockOp> {
        prop_oneof![Just(ClockOp::Tick), (0u64..1_000).prop_map(ClockOp::Update)]
    }

    #[test]
    fn starts_at_zero() {
        assert_eq!(LogicalClock::new().get(), 0);
    }

    #[test]
    fn tick_returns_post_increment_value() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.get(), 2);
    }

    #[test]
    fn update_below_current_is_noop() {
        let mut clock = LogicalClock::new();
        clock.update(3);
        clock.update(2);
        assert_eq!(clock.get(), 3);
    }

    #[test]
    fn update_jumps_without_extra_increment() {
        let mut clock = LogicalClock::new();
        assert_eq!(clock.tick(), 1);
        clock.update(5);
        assert_eq!(clock.get(), 5);
        assert_eq!(clock.tick(), 6);
    }

    #[test]
    fn tick_saturates() {
        let mut clock = LogicalClock::new();
        clock.update(u64::MAX);
        assert_eq!(clock.tick(), u64::MAX);
    }

    proptest! {
        #[test]
        fn never_decreases(ops in proptest::collection::vec(clock_op(), 0..200)) {
            let mut clock = LogicalClock::new();
            let mut previous = clock.get();

            for op in ops {
                match op {
                    ClockOp::Tick => {
                        let returned = clock.tick();
                        prop_assert_eq!(returned, previous + 1);
                        prop_assert_eq!(clock.get(), returned);
                    },
                    ClockOp::Update(received) => {
                        clock.update(received);
                        prop_assert_eq!(clock.get(), previous.max(received));
                    },
                }
                prop_assert!(clock.get() >= previous);
                previous = clock.get();
            }
        }
    }
}
