//! Job queue: a fixed-capacity ring of zero-argument callbacks, run by the
//! task that takes them.
//!
//! A job is a plain function pointer with no captured state, mirroring a
//! C `void (*)(void)`. Three producer-side operations trade off blocking
//! against overwriting: `give` fails fast on a full queue, `send_for`
//! blocks until space frees up, and `push` never blocks or fails,
//! overwriting the oldest entry instead — the only one of the three safe
//! to call from interrupt context. `take` runs the job it retrieves
//! before returning; there is no handle a caller can hold and run later.

use crate::collections::RingBuf;
use crate::object::{ObjectHeader, Storage, Waitable};
use crate::outcome::Outcome;
use crate::sched::{Enlist, Scheduler};
use crate::task::{Scratch, TaskIndex};
use crate::time::Duration;
use crate::waitqueue::WaiterQueue;

/// A job: a zero-argument, no-capture callback.
pub type Job = fn();

crate::static_assert!(
    core::mem::size_of::<Job>() == core::mem::size_of::<usize>(),
    "Job must round-trip through Scratch::ProducerValue's usize slot"
);

/// Result of starting a blocking [`JobQueue::take`] or [`JobQueue::send_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStart {
    /// Resolved from the fast path; for `take`, if `Outcome::Success`, the
    /// job already ran.
    Resolved(Outcome),
    /// Enlisted as a consumer or producer; the caller must read the final
    /// result later via [`JobQueue::resolve`] or [`JobQueue::resolve_send`].
    Blocked,
}

/// A fixed-capacity job queue.
pub struct JobQueue<const N: usize> {
    header: ObjectHeader,
    /// Producers blocked in [`JobQueue::send_for`] on a full ring. Separate
    /// from `header.waiters` (consumers blocked on an empty ring) since a
    /// task is never simultaneously a producer and a consumer of the same
    /// queue.
    producers: WaiterQueue,
    ring: RingBuf<Job, N>,
}

impl<const N: usize> Waitable for JobQueue<N> {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }
}

impl<const N: usize> JobQueue<N> {
    /// Creates a statically-backed, empty job queue.
    #[must_use]
    pub const fn new_static() -> Self {
        Self { header: ObjectHeader::new_static(), producers: WaiterQueue::new(), ring: RingBuf::new() }
    }

    /// Creates a dynamically-backed job queue (see [`ObjectHeader::new_dynamic`]).
    #[must_use]
    pub const fn new_dynamic() -> Self {
        Self { header: ObjectHeader::new_dynamic(), producers: WaiterQueue::new(), ring: RingBuf::new() }
    }

    /// Number of jobs currently queued (excludes any pending direct
    /// hand-off to a blocked consumer, which never touches the ring).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the ring holds no queued jobs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Whether the ring is at capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    fn try_deliver<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>, job: Job) -> Result<(), Job> {
        let scratch = Scratch::ProducerValue(job as usize);
        if sched.wake_one_with(&mut self.header, Outcome::Success, scratch).is_some() {
            return Ok(());
        }
        self.ring.try_push(job)
    }

    /// Non-blocking enqueue: hands `job` directly to a waiting consumer if
    /// one exists, otherwise stores it in the ring. Returns
    /// [`Outcome::Timeout`] without enlisting if the ring is full and no
    /// consumer is waiting.
    pub fn give<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>, job: Job) -> Outcome {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released job queue");
        match self.try_deliver(sched, job) {
            Ok(()) => Outcome::Success,
            Err(_) => Outcome::Timeout,
        }
    }

    /// Blocking enqueue: like [`JobQueue::give`], but on a full ring with
    /// no waiting consumer, enlists the calling task (`idx`) as a producer
    /// for up to `delay` ticks instead of failing.
    pub fn send_for<const M: usize, const PRIOS: usize>(
        &mut self,
        sched: &mut Scheduler<M, PRIOS>,
        idx: TaskIndex,
        job: Job,
        delay: Duration,
    ) -> WaitStart {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released job queue");
        match self.try_deliver(sched, job) {
            Ok(()) => WaitStart::Resolved(Outcome::Success),
            Err(job) => {
                sched.set_scratch(idx, Scratch::ProducerValue(job as usize));
                match sched.sleep_for(&mut self.producers, idx, delay) {
                    Enlist::Immediate => WaitStart::Resolved(Outcome::Timeout),
                    Enlist::Blocked => WaitStart::Blocked,
                }
            }
        }
    }

    /// Reads the final result of a [`JobQueue::send_for`] that returned
    /// [`WaitStart::Blocked`]. The job itself was already deposited by
    /// [`JobQueue::take`] at the moment the producer woke, so this is a
    /// plain outcome read.
    #[must_use]
    pub fn resolve_send<const M: usize, const PRIOS: usize>(sched: &Scheduler<M, PRIOS>, idx: TaskIndex) -> Outcome {
        sched.outcome(idx)
    }

    /// Enqueues `job`, overwriting the oldest entry if the ring is full.
    ///
    /// Hands it directly to the longest-waiting consumer if one is
    /// blocked in [`JobQueue::take`]; otherwise stores it, never blocking
    /// or failing. Safe to call from interrupt context.
    pub fn push<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>, job: Job) {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released job queue");
        if self.try_deliver(sched, job).is_ok() {
            return;
        }
        self.ring.force_push(job);
    }

    /// Blocking take: runs and removes the oldest queued job if one is
    /// present. If a producer was blocked in [`JobQueue::send_for`] on a
    /// full ring, its job is deposited into the slot this vacates and it
    /// wakes with [`Outcome::Success`] before `take` returns. On a
    /// fast-path miss, enlists the calling task (`idx`) as a consumer for
    /// up to `delay` ticks.
    pub fn take<const M: usize, const PRIOS: usize>(
        &mut self,
        sched: &mut Scheduler<M, PRIOS>,
        idx: TaskIndex,
        delay: Duration,
    ) -> WaitStart {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released job queue");
        if let Some(job) = self.ring.pop() {
            if let Some(pidx) = sched.wake_one_raw(&mut self.producers, Outcome::Success) {
                if let Scratch::ProducerValue(raw) = sched.scratch(pidx) {
                    // SAFETY: only `send_for` writes `ProducerValue` into a
                    // producer's scratch slot, and always a `Job` cast to
                    // `usize`.
                    let waiting_job: Job = unsafe { core::mem::transmute::<usize, Job>(raw) };
                    // The pop above just freed exactly one slot.
                    self.ring.try_push(waiting_job).ok();
                }
            }
            job();
            return WaitStart::Resolved(Outcome::Success);
        }
        sched.set_scratch(idx, Scratch::None);
        match sched.enlist(&mut self.header, idx, delay) {
            Enlist::Immediate => WaitStart::Resolved(Outcome::Timeout),
            Enlist::Blocked => WaitStart::Blocked,
        }
    }

    /// Reads the final result of a take started by [`JobQueue::take`] that
    /// returned [`WaitStart::Blocked`], once the caller knows the task has
    /// since been woken. Runs the handed-off job on a successful wake.
    pub fn resolve<const M: usize, const PRIOS: usize>(sched: &Scheduler<M, PRIOS>, idx: TaskIndex) -> Outcome {
        let outcome = sched.outcome(idx);
        if outcome == Outcome::Success {
            if let Scratch::ProducerValue(raw) = sched.scratch(idx) {
                // SAFETY: only `JobQueue::push`/`give` ever write
                // `ProducerValue` into a consumer's scratch slot, and
                // always a `Job` cast to `usize`, never any other payload.
                let job: Job = unsafe { core::mem::transmute::<usize, Job>(raw) };
                job();
            }
        }
        outcome
    }

    /// Wakes every waiting consumer and producer with [`Outcome::Stopped`].
    /// The queue and any jobs already in the ring remain intact.
    pub fn reset<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Stopped);
        while sched.wake_one_raw(&mut self.producers, Outcome::Stopped).is_some() {}
    }

    /// Wakes every waiting consumer and producer with [`Outcome::Deleted`]
    /// and marks the queue released.
    pub fn destroy<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Deleted);
        while sched.wake_one_raw(&mut self.producers, Outcome::Deleted).is_some() {}
        self.header.alive = false;
    }

    /// Whether this queue's storage was allocated dynamically.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.header.storage, Storage::Dynamic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};
    use crate::task::Priority;

    fn idx(i: u16) -> TaskIndex {
        TaskIndex::new(i)
    }

    static RAN: AtomicU32 = AtomicU32::new(0);

    fn bump() {
        RAN.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn push_then_take_runs_synchronously() {
        RAN.store(0, Ordering::Relaxed);
        let mut sched = Scheduler::<4, 3>::new();
        let mut q = JobQueue::<4>::new_static();
        q.push(&mut sched, bump);
        let start = q.take(&mut sched, idx(0), Duration::INFINITE);
        assert_eq!(start, WaitStart::Resolved(Outcome::Success));
        assert_eq!(RAN.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn blocked_consumer_receives_direct_handoff() {
        // Scenario 3: consumer blocks first, producer pushes straight to it.
        RAN.store(0, Ordering::Relaxed);
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut q = JobQueue::<4>::new_static();
        let start = q.take(&mut sched, idx(0), Duration::INFINITE);
        assert_eq!(start, WaitStart::Blocked);
        assert!(q.is_empty());
        q.push(&mut sched, bump);
        assert!(q.is_empty(), "direct hand-off must bypass the ring");
        assert_eq!(JobQueue::<4>::resolve(&sched, idx(0)), Outcome::Success);
        assert_eq!(RAN.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn push_overwrites_oldest_when_full() {
        // Scenario 4: no consumer waiting, ring at capacity.
        let mut sched = Scheduler::<4, 3>::new();
        let mut q = JobQueue::<2>::new_static();
        q.push(&mut sched, bump);
        q.push(&mut sched, bump);
        assert!(q.is_full());
        q.push(&mut sched, bump); // overwrites the oldest, still length 2
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn give_times_out_without_enlisting_when_full() {
        let mut sched = Scheduler::<4, 3>::new();
        let mut q = JobQueue::<2>::new_static();
        assert_eq!(q.give(&mut sched, bump), Outcome::Success);
        assert_eq!(q.give(&mut sched, bump), Outcome::Success);
        assert_eq!(q.give(&mut sched, bump), Outcome::Timeout);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn send_for_blocks_then_delivers_when_take_frees_a_slot() {
        RAN.store(0, Ordering::Relaxed);
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(1), Priority::new(1)); // producer
        let mut q = JobQueue::<2>::new_static();
        q.give(&mut sched, bump); // fills one of two slots
        q.give(&mut sched, bump); // fills the last slot

        let start = q.send_for(&mut sched, idx(1), bump, Duration::INFINITE);
        assert_eq!(start, WaitStart::Blocked);
        assert!(q.is_full());

        // A consumer's take pops the existing job and, in the same call,
        // deposits the blocked producer's job into the freed slot.
        let taken = q.take(&mut sched, idx(0), Duration::IMMEDIATE);
        assert_eq!(taken, WaitStart::Resolved(Outcome::Success));
        assert_eq!(RAN.load(Ordering::Relaxed), 1);
        assert_eq!(q.len(), 1);
        assert_eq!(JobQueue::<2>::resolve_send(&sched, idx(1)), Outcome::Success);
    }

    #[test]
    fn take_with_immediate_delay_times_out() {
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut q = JobQueue::<4>::new_static();
        let start = q.take(&mut sched, idx(0), Duration::IMMEDIATE);
        assert_eq!(start, WaitStart::Resolved(Outcome::Timeout));
    }

    #[test]
    fn destroy_wakes_waiters_deleted() {
        let mut sched = Scheduler::<4, 3>::new();
        sched.start(idx(0), Priority::new(1));
        let mut q = JobQueue::<4>::new_static();
        q.take(&mut sched, idx(0), Duration::INFINITE);
        q.destroy(&mut sched);
        assert_eq!(JobQueue::<4>::resolve(&sched, idx(0)), Outcome::Deleted);
    }
}
