//! Nestable interrupt-disable critical section.
//!
//! Every kernel data structure — ready queues, waiter queues, signal masks,
//! ring indices — is guarded by exactly one conceptual lock: disable
//! interrupts, do the work, re-enable. Unlike a spinlock this needs no
//! atomic contention handling on a single core; what it does need is
//! nesting, since kernel operations call into each other (e.g. `give`
//! calling `wake_one` calling the ready-queue insert) while already holding
//! the lock. Only the outermost `unlock` actually re-enables interrupts.
//!
//! A [`CriticalSection`] is owned by the [`Scheduler`](crate::sched::Scheduler)
//! instance it protects rather than kept as a single process-wide static:
//! on real hardware there is exactly one kernel and one interrupt
//! controller, but a library crate may have several independent
//! `Scheduler`s alive at once (notably in tests), and those must not
//! contend on each other's interrupt state.

use crate::cell::RacyCell;

#[cfg(all(target_os = "none", target_arch = "x86_64"))]
mod arch {
    /// Disables interrupts, returning the prior interrupt-enable flag.
    #[inline]
    pub fn disable() -> u64 {
        let flags: u64;
        // SAFETY: reads and clears the interrupt flag via standard x86_64
        // instructions; does not touch memory.
        unsafe {
            core::arch::asm!("pushfq; pop {}", out(reg) flags, options(nomem, preserves_flags));
            core::arch::asm!("cli", options(nomem, nostack));
        }
        flags
    }

    /// Restores interrupts to the state captured by [`disable`].
    #[inline]
    pub fn restore(flags: u64) {
        const IF_BIT: u64 = 1 << 9;
        if flags & IF_BIT != 0 {
            // SAFETY: re-enables interrupts only if they were enabled before.
            unsafe { core::arch::asm!("sti", options(nomem, nostack)) };
        }
    }
}

#[cfg(not(all(target_os = "none", target_arch = "x86_64")))]
mod arch {
    /// Host fallback: there is no real interrupt controller to mask, so the
    /// "flags" are a unit value and disable/restore are no-ops beyond the
    /// depth counter in [`super::CriticalSection`].
    #[inline]
    pub fn disable() -> u64 {
        0
    }

    #[inline]
    pub fn restore(_flags: u64) {}
}

/// A nestable interrupt-disable lock, scoped to the kernel instance that
/// owns it. Construct one [`CriticalSection`] per [`Scheduler`] and call
/// [`CriticalSection::enter`] at the top of any method that touches the
/// scheduler's state.
pub struct CriticalSection {
    depth: RacyCell<u32>,
    saved_flags: RacyCell<u64>,
}

impl CriticalSection {
    /// Creates a new, unentered critical section.
    pub const fn new() -> Self {
        Self { depth: RacyCell::new(0), saved_flags: RacyCell::new(0) }
    }

    /// Enters the critical section, disabling interrupts if this is the
    /// outermost entry. Returns a guard that restores the prior state when
    /// dropped.
    #[inline]
    #[must_use]
    pub fn enter(&self) -> CriticalSectionGuard<'_> {
        // SAFETY: single-core kernel instance; `depth`/`saved_flags` are
        // only touched through this lock's own methods, with interrupts
        // already disabled once depth > 0.
        unsafe {
            let depth = self.depth.get();
            if *depth == 0 {
                let flags = arch::disable();
                *self.saved_flags.get() = flags;
            }
            *depth += 1;
        }
        CriticalSectionGuard { lock: self, _not_send: core::marker::PhantomData }
    }

    /// Returns the current nesting depth. `0` means interrupts are enabled.
    pub fn depth(&self) -> u32 {
        // SAFETY: read-only snapshot of this instance's own counter.
        unsafe { *self.depth.get() }
    }
}

impl Default for CriticalSection {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by [`CriticalSection::enter`]. Not `Send`: the
/// critical section must be left on the same execution context that
/// entered it. The `PhantomData<*const ()>` field is load-bearing, not
/// decorative: it suppresses the auto-derived `Send`/`Sync` that would
/// otherwise follow from `&CriticalSection` (whose `RacyCell` fields are
/// themselves `unsafe impl Sync`), since this crate has no access to
/// `negative_impls` on stable.
pub struct CriticalSectionGuard<'a> {
    lock: &'a CriticalSection,
    _not_send: core::marker::PhantomData<*const ()>,
}

impl Drop for CriticalSectionGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: paired with the increment in `enter`; depth is never zero
        // here because a guard's existence implies at least one entry.
        unsafe {
            let depth = self.lock.depth.get();
            *depth -= 1;
            if *depth == 0 {
                arch::restore(*self.lock.saved_flags.get());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_and_unwinds() {
        let lock = CriticalSection::new();
        assert_eq!(lock.depth(), 0);
        let outer = lock.enter();
        assert_eq!(lock.depth(), 1);
        {
            let _inner = lock.enter();
            assert_eq!(lock.depth(), 2);
        }
        assert_eq!(lock.depth(), 1);
        drop(outer);
        assert_eq!(lock.depth(), 0);
    }

    #[test]
    fn independent_instances_do_not_share_state() {
        let a = CriticalSection::new();
        let b = CriticalSection::new();
        let _guard = a.enter();
        assert_eq!(a.depth(), 1);
        assert_eq!(b.depth(), 0);
    }
}
