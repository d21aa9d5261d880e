//! Signal set: a bitmask of pending signals with a sticky-bit protect mask.
//!
//! `pending` tracks which signal numbers have been raised; `protect`,
//! fixed at construction, marks which of those numbers remain pending
//! after being observed instead of being consumed. `take`/`give` work in
//! terms of `Signal` bit positions; `give` wakes the first waiter (or, for
//! a sticky bit, every waiter) whose requested mask contains the bit just
//! raised.

use crate::id::Signal;
use crate::object::{ObjectHeader, Storage, Waitable};
use crate::outcome::Outcome;
use crate::sched::{Enlist, Scheduler};
use crate::task::{Scratch, TaskIndex};
use crate::time::Duration;

/// Result of a signal-set operation that can deliver a specific bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Signal number `0 <= s < WORD_BITS` was delivered.
    Signalled(u32),
    /// The set was reset while the caller was waiting.
    Stopped,
    /// The set was destroyed while the caller was waiting.
    Deleted,
    /// No matching signal was pending and no deadline remains.
    Timeout,
}

/// Outcome of starting a blocking wait: either resolved immediately from
/// the fast path, or the caller is now enlisted and must read the final
/// result later via [`SignalSet::resolve`] once it knows (from its own
/// sequencing, or a real context switch on hardware) that a wake occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStart {
    /// The fast path already produced this result; no enlistment happened.
    Resolved(SignalOutcome),
    /// The calling task was enlisted and is now blocked or delayed.
    Blocked,
}

/// A signal set primitive.
pub struct SignalSet {
    header: ObjectHeader,
    pending: u32,
    protect: u32,
}

impl Waitable for SignalSet {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }
}

impl SignalSet {
    /// Creates a statically-backed signal set. Bits set in `protect` are
    /// sticky: `take`/`give` leave them pending after delivery.
    #[must_use]
    pub const fn new_static(protect: u32) -> Self {
        Self { header: ObjectHeader::new_static(), pending: 0, protect }
    }

    /// Creates a dynamically-backed signal set (see [`ObjectHeader::new_dynamic`]).
    #[must_use]
    pub const fn new_dynamic(protect: u32) -> Self {
        Self { header: ObjectHeader::new_dynamic(), pending: 0, protect }
    }

    /// Returns the current pending mask.
    #[must_use]
    pub const fn pending(&self) -> u32 {
        self.pending
    }

    /// Non-blocking take: consumes the lowest pending bit in `mask` unless
    /// it is sticky. Returns `Timeout` if no requested bit is pending.
    pub fn take(&mut self, mask: u32) -> SignalOutcome {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released signal set");
        let hit = self.pending & mask;
        if hit == 0 {
            return SignalOutcome::Timeout;
        }
        let s = hit.trailing_zeros();
        if self.protect & (1 << s) == 0 {
            self.pending &= !(1 << s);
        }
        SignalOutcome::Signalled(s)
    }

    /// Blocking wait for any bit in `mask`. On a fast-path miss, enlists
    /// the calling task (identified by `idx`) for up to `delay` ticks.
    pub fn wait_for<const N: usize, const PRIOS: usize>(
        &mut self,
        sched: &mut Scheduler<N, PRIOS>,
        idx: TaskIndex,
        mask: u32,
        delay: Duration,
    ) -> WaitStart {
        match self.take(mask) {
            SignalOutcome::Timeout => {
                sched.set_scratch(idx, Scratch::SignalMask(mask));
                match sched.enlist(&mut self.header, idx, delay) {
                    Enlist::Immediate => WaitStart::Resolved(SignalOutcome::Timeout),
                    Enlist::Blocked => WaitStart::Blocked,
                }
            }
            resolved => WaitStart::Resolved(resolved),
        }
    }

    /// Reads the final result of a wait started by [`SignalSet::wait_for`]
    /// that returned [`WaitStart::Blocked`], once the caller knows the task
    /// has since been woken.
    #[must_use]
    pub fn resolve<const N: usize, const PRIOS: usize>(
        sched: &Scheduler<N, PRIOS>,
        idx: TaskIndex,
    ) -> SignalOutcome {
        match sched.outcome(idx) {
            Outcome::Success => match sched.scratch(idx) {
                Scratch::ProducerValue(s) => SignalOutcome::Signalled(s as u32),
                _ => SignalOutcome::Signalled(0),
            },
            Outcome::Stopped => SignalOutcome::Stopped,
            Outcome::Deleted => SignalOutcome::Deleted,
            Outcome::Timeout => SignalOutcome::Timeout,
        }
    }

    /// Raises `s`, setting its bit and waking matching waiters.
    ///
    /// Walks the waiter queue head to tail; each waiter whose stored mask
    /// contains `s`'s bit wakes with that signal number. For a non-sticky
    /// bit at most one waiter wakes and the bit is cleared immediately
    /// after; for a sticky bit every matching waiter wakes and the bit
    /// stays pending.
    pub fn give<const N: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<N, PRIOS>, s: Signal) {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released signal set");
        let bit = s.mask();
        self.pending |= bit;
        let scratch = Scratch::ProducerValue(s.bit() as usize);
        loop {
            let woken = sched.wake_where(&mut self.header, Outcome::Success, scratch, |s| {
                matches!(s, Scratch::SignalMask(m) if m & bit != 0)
            });
            match woken {
                Some(_) => {
                    if self.protect & bit == 0 {
                        self.pending &= !bit;
                        break;
                    }
                }
                None => break,
            }
        }
    }

    /// Unconditionally clears `s`'s bit, whether or not it is sticky.
    pub fn clear(&mut self, s: Signal) {
        self.pending &= !s.mask();
    }

    /// Wakes every waiter with [`Outcome::Stopped`]. The set remains usable.
    pub fn reset<const N: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<N, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Stopped);
    }

    /// Wakes every waiter with [`Outcome::Deleted`] and marks the set
    /// released. Further operations are a precondition violation.
    pub fn destroy<const N: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<N, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Deleted);
        self.header.alive = false;
    }

    /// Whether this set's storage was allocated dynamically.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.header.storage, Storage::Dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn idx(i: u16) -> TaskIndex {
        TaskIndex::new(i)
    }

    #[test]
    fn take_on_empty_is_timeout() {
        let mut sig = SignalSet::new_static(0);
        assert_eq!(sig.take(0xFF), SignalOutcome::Timeout);
    }

    #[test]
    fn non_sticky_signal_handoff() {
        // Scenario 1: task A waits on bit 3, task B gives bit 3.
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut sig = SignalSet::new_static(0);
        let start = sig.wait_for(&mut sched, idx(0), Signal::new(3).mask(), Duration::INFINITE);
        assert_eq!(start, WaitStart::Blocked);
        sig.give(&mut sched, Signal::new(3));
        assert_eq!(SignalSet::resolve(&sched, idx(0)), SignalOutcome::Signalled(3));
        assert_eq!(sig.pending(), 0);
    }

    #[test]
    fn sticky_signal_broadcasts_to_all_waiters() {
        // Scenario 2: protect bit 5, two waiters, one give wakes both and
        // leaves the bit pending.
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        sched.start(idx(1), Priority::new(1));
        let mut sig = SignalSet::new_static(Signal::new(5).mask());
        sig.wait_for(&mut sched, idx(0), Signal::new(5).mask(), Duration::INFINITE);
        sig.wait_for(&mut sched, idx(1), Signal::new(5).mask(), Duration::INFINITE);
        sig.give(&mut sched, Signal::new(5));
        assert_eq!(SignalSet::resolve(&sched, idx(0)), SignalOutcome::Signalled(5));
        assert_eq!(SignalSet::resolve(&sched, idx(1)), SignalOutcome::Signalled(5));
        assert_eq!(sig.pending(), Signal::new(5).mask());
    }

    #[test]
    fn give_with_no_waiters_just_sets_bit() {
        let mut sched = Scheduler::<4, 3>::new();
        let mut sig = SignalSet::new_static(0);
        sig.give(&mut sched, Signal::new(1));
        assert_eq!(sig.pending(), Signal::new(1).mask());
    }

    #[test]
    fn reset_wakes_waiters_stopped() {
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut sig = SignalSet::new_static(0);
        sig.wait_for(&mut sched, idx(0), Signal::new(0).mask(), Duration::INFINITE);
        sig.reset(&mut sched);
        assert_eq!(SignalSet::resolve(&sched, idx(0)), SignalOutcome::Stopped);
    }

    #[test]
    fn destroy_wakes_waiters_deleted() {
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut sig = SignalSet::new_static(0);
        sig.wait_for(&mut sched, idx(0), Signal::new(0).mask(), Duration::INFINITE);
        sig.destroy(&mut sched);
        assert_eq!(SignalSet::resolve(&sched, idx(0)), SignalOutcome::Deleted);
        assert!(!sig.header.alive);
    }

    #[test]
    fn clear_unconditionally_clears_sticky_bit() {
        let mut sig = SignalSet::new_static(Signal::new(2).mask());
        let mut sched = Scheduler::<4, 3>::new();
        sig.give(&mut sched, Signal::new(2));
        assert_ne!(sig.pending() & Signal::new(2).mask(), 0);
        sig.clear(Signal::new(2));
        assert_eq!(sig.pending() & Signal::new(2).mask(), 0);
    }

    #[test]
    fn immediate_wait_times_out_without_enlisting() {
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut sig = SignalSet::new_static(0);
        let start = sig.wait_for(&mut sched, idx(0), Signal::new(0).mask(), Duration::IMMEDIATE);
        assert_eq!(start, WaitStart::Resolved(SignalOutcome::Timeout));
    }
}
