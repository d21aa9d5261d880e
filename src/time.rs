//! Monotonic tick timebase and timed-wait sentinel durations.

use core::fmt;

/// A count of scheduler ticks since boot. Comparisons beyond equality use
/// wrapping-aware signed difference so a wraparound does not corrupt
/// deadline ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Tick(u64);

impl Tick {
    /// The zero tick.
    pub const ZERO: Tick = Tick(0);

    /// Creates a `Tick` from a raw count.
    pub const fn new(val: u64) -> Self {
        Self(val)
    }

    /// Returns the raw tick count.
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns `self + d`, wrapping on overflow rather than saturating, so a
    /// tick count that wraps past `u64::MAX` does not corrupt a deadline
    /// computed from it.
    pub const fn wrapping_add(self, d: Duration) -> Self {
        match d {
            Duration::Infinite => Tick(u64::MAX),
            Duration::Ticks(n) => Tick(self.0.wrapping_add(n)),
        }
    }

    /// Returns whether `self` has reached or passed `deadline`, using a
    /// signed difference so a wraparound of either tick does not flip the
    /// comparison.
    pub const fn has_reached(self, deadline: Tick) -> bool {
        (self.0.wrapping_sub(deadline.0) as i64) >= 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A timed-wait duration expressed in ticks, with two distinguished
/// sentinels: `IMMEDIATE` (don't block at all) and `INFINITE` (no deadline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Duration {
    /// Block for exactly `n` ticks (`0` is `IMMEDIATE`).
    Ticks(u64),
    /// Block with no deadline.
    Infinite,
}

impl Duration {
    /// The distinguished "do not block" duration.
    pub const IMMEDIATE: Duration = Duration::Ticks(0);
    /// The distinguished "no deadline" duration.
    pub const INFINITE: Duration = Duration::Infinite;

    /// Returns whether this duration is the `IMMEDIATE` sentinel.
    pub const fn is_immediate(self) -> bool {
        matches!(self, Duration::Ticks(0))
    }
}

/// Supplies the current tick to the scheduler.
///
/// Implemented once per target by whatever drives the timebase (a hardware
/// timer interrupt on a real MCU, a test clock on host).
pub trait Clock {
    /// Returns the current tick count.
    fn now(&self) -> Tick;

    /// Arms the next wake interrupt at `deadline`. Called whenever the
    /// earliest pending deadline across all timed waiters changes.
    ///
    /// The default implementation does nothing, appropriate for targets
    /// that instead poll `now()` every tick regardless of pending deadlines.
    fn arm(&self, _deadline: Tick) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_add_infinite() {
        assert_eq!(Tick::new(5).wrapping_add(Duration::INFINITE), Tick(u64::MAX));
    }

    #[test]
    fn wrapping_add_ticks() {
        assert_eq!(Tick::new(5).wrapping_add(Duration::Ticks(10)), Tick::new(15));
    }

    #[test]
    fn wrapping_add_overflow_wraps_instead_of_saturating() {
        assert_eq!(Tick::new(u64::MAX).wrapping_add(Duration::Ticks(1)), Tick::new(0));
        assert_eq!(Tick::new(u64::MAX).wrapping_add(Duration::Ticks(3)), Tick::new(2));
    }

    #[test]
    fn has_reached() {
        assert!(Tick::new(10).has_reached(Tick::new(10)));
        assert!(Tick::new(11).has_reached(Tick::new(10)));
        assert!(!Tick::new(9).has_reached(Tick::new(10)));
    }

    #[test]
    fn has_reached_across_wraparound() {
        // `now` wrapped past `u64::MAX` to 5; a deadline set shortly before
        // the wrap (u64::MAX - 2) must already read as reached.
        assert!(Tick::new(5).has_reached(Tick::new(u64::MAX - 2)));
        // A deadline still ahead of the wrapped `now` must not.
        assert!(!Tick::new(5).has_reached(Tick::new(100)));
    }

    #[test]
    fn immediate_is_zero_ticks() {
        assert!(Duration::IMMEDIATE.is_immediate());
        assert!(!Duration::Ticks(1).is_immediate());
        assert!(!Duration::INFINITE.is_immediate());
    }
}
