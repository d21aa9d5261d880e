//! The task scheduler: a fixed-capacity pool of tasks, a priority-ordered
//! ready queue, and the timed-wait engine that expires deadlines.
//!
//! Real context-switch trampolines (saving/restoring a CPU register file)
//! are architecture-specific and out of scope here — this type owns only
//! the *scheduling decisions*: which task is ready, which is blocked on
//! what, and which outcome a waiter wakes up with. A caller driving real
//! hardware pairs this with an interrupt-driven context switch that, on
//! seeing a task transition to `Ready`, actually resumes its stack; a test
//! driving this crate on host instead reads [`Scheduler::outcome`] once it
//! knows (from its own sequencing) that a wake has occurred.
//!
//! Ready-queue bands reuse [`WaiterQueue`]'s priority-ordered insertion:
//! within one band every member shares the same priority, so insertion
//! degenerates to a plain FIFO append, giving round-robin order for free.

use core::ptr::NonNull;

use crate::id::TaskIndex;
use crate::lock::CriticalSection;
use crate::object::Waitable;
use crate::outcome::Outcome;
use crate::task::{Priority, Scratch, Task, TaskId, TaskState};
use crate::time::{Duration, Tick};
use crate::waitqueue::WaiterQueue;

/// Whether [`Scheduler::enlist`] actually blocked the task or resolved it
/// immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enlist {
    /// The task was enlisted in the object's waiter queue and is now
    /// `Blocked` or `Delayed`.
    Blocked,
    /// `delay` was [`Duration::IMMEDIATE`]; the task was left untouched and
    /// [`Outcome::Timeout`] was stamped directly.
    Immediate,
}

/// Intrusive FIFO of every task on a timed wait, strictly in enlistment
/// order and independent of priority.
///
/// A task's waiter queue (see [`WaiterQueue`]) orders by priority, which is
/// the right order to wake from when space/data frees up but the wrong
/// order to expire deadlines in: two tasks sharing a deadline must time out
/// in the order they were enlisted, not in priority order. This list exists
/// solely to give [`Scheduler::tick`] that stable order.
#[derive(Debug, Clone, Copy)]
struct TimerList {
    head: Option<TaskIndex>,
    tail: Option<TaskIndex>,
}

impl TimerList {
    const fn new() -> Self {
        Self { head: None, tail: None }
    }

    fn insert_tail(&mut self, tasks: &mut [Task], idx: TaskIndex) {
        tasks[idx.as_usize()].timer_next = None;
        match self.tail {
            Some(t) => tasks[t.as_usize()].timer_next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }

    fn remove(&mut self, tasks: &mut [Task], idx: TaskIndex) {
        let mut cursor = self.head;
        let mut prev: Option<TaskIndex> = None;
        while let Some(c) = cursor {
            if c == idx {
                let next = tasks[c.as_usize()].timer_next.take();
                match prev {
                    Some(p) => tasks[p.as_usize()].timer_next = next,
                    None => self.head = next,
                }
                if self.tail == Some(c) {
                    self.tail = prev;
                }
                return;
            }
            prev = Some(c);
            cursor = tasks[c.as_usize()].timer_next;
        }
    }
}

/// A fixed-capacity preemptive scheduler.
///
/// `N` is the task pool size; `PRIOS` is the number of priority bands
/// (valid priorities are `0..PRIOS`, `0` highest).
pub struct Scheduler<const N: usize, const PRIOS: usize> {
    tasks: [Task; N],
    ready: [WaiterQueue; PRIOS],
    timers: TimerList,
    lock: CriticalSection,
    now: Tick,
    in_isr: bool,
}

impl<const N: usize, const PRIOS: usize> Scheduler<N, PRIOS> {
    /// Creates a scheduler with `N` dormant task slots, numbered `0..N`.
    #[must_use]
    pub fn new() -> Self {
        assert!(PRIOS > 0, "a scheduler needs at least one priority band");
        Self {
            tasks: core::array::from_fn(|i| Task::new(TaskId(i as u32), Priority::new(0))),
            ready: core::array::from_fn(|_| WaiterQueue::new()),
            timers: TimerList::new(),
            lock: CriticalSection::new(),
            now: Tick::ZERO,
            in_isr: false,
        }
    }

    /// Marks subsequent calls as happening from interrupt context, or
    /// leaves it (for the architecture's ISR entry/exit trampoline, out of
    /// scope here, to toggle around the handler body).
    pub fn set_in_isr(&mut self, in_isr: bool) {
        self.in_isr = in_isr;
    }

    /// The scheduler's own view of the current tick.
    #[must_use]
    pub const fn now(&self) -> Tick {
        self.now
    }

    /// Read-only access to a task's state.
    #[must_use]
    pub fn state(&self, idx: TaskIndex) -> TaskState {
        self.tasks[idx.as_usize()].state
    }

    /// Read-only access to a task's stamped outcome (the result of its most
    /// recent blocking call).
    #[must_use]
    pub fn outcome(&self, idx: TaskIndex) -> Outcome {
        self.tasks[idx.as_usize()].outcome
    }

    /// Read-only access to a task's scratch hand-off slot.
    #[must_use]
    pub fn scratch(&self, idx: TaskIndex) -> Scratch {
        self.tasks[idx.as_usize()].scratch
    }

    /// Sets a task's scratch hand-off slot. Used by a primitive's blocking
    /// path to record what the task is waiting to exchange before calling
    /// [`Scheduler::enlist`].
    pub fn set_scratch(&mut self, idx: TaskIndex, scratch: Scratch) {
        self.tasks[idx.as_usize()].scratch = scratch;
    }

    /// Peeks the task that would run next: the head of the highest
    /// priority non-empty ready band. Does not alter any state.
    #[must_use]
    pub fn pick(&self) -> Option<TaskIndex> {
        self.ready.iter().find_map(WaiterQueue::peek_front)
    }

    /// Starts a dormant task at `priority`, making it ready.
    ///
    /// Returns `false` if `idx` is not currently dormant.
    pub fn start(&mut self, idx: TaskIndex, priority: Priority) -> bool {
        let _guard = self.lock.enter();
        if self.tasks[idx.as_usize()].state != TaskState::Dormant {
            return false;
        }
        self.tasks[idx.as_usize()].priority = priority;
        self.tasks[idx.as_usize()].state = TaskState::Ready;
        self.ready[priority.as_usize()].insert(&mut self.tasks, idx);
        crate::trace!(TaskStarted(idx));
        true
    }

    /// Stops a task unconditionally: cancels any wait, removes it from
    /// every queue, and transitions it to `Dormant`. Any task joined on it
    /// wakes with [`Outcome::Success`].
    pub fn stop(&mut self, idx: TaskIndex) {
        let _guard = self.lock.enter();
        self.unlink(idx);
        self.tasks[idx.as_usize()].state = TaskState::Dormant;
        crate::trace!(TaskStopped(idx));
        let mut joiners = core::mem::take(&mut self.tasks[idx.as_usize()].joiners);
        let Self { tasks, ready, .. } = self;
        while let Some(w) = joiners.pop_front(tasks) {
            tasks[w.as_usize()].waitq = None;
            tasks[w.as_usize()].outcome = Outcome::Success;
            tasks[w.as_usize()].state = TaskState::Ready;
            ready[tasks[w.as_usize()].priority.as_usize()].insert(tasks, w);
        }
    }

    /// Administratively suspends a ready task; it will not be picked to
    /// run until [`Scheduler::resume`] is called, even though it is not
    /// waiting on any object.
    pub fn suspend(&mut self, idx: TaskIndex) -> bool {
        let _guard = self.lock.enter();
        if self.tasks[idx.as_usize()].state != TaskState::Ready {
            return false;
        }
        self.ready[self.tasks[idx.as_usize()].priority.as_usize()].remove(&mut self.tasks, idx);
        self.tasks[idx.as_usize()].state = TaskState::Suspended;
        true
    }

    /// Resumes a suspended task back into its ready band.
    pub fn resume(&mut self, idx: TaskIndex) -> bool {
        let _guard = self.lock.enter();
        if self.tasks[idx.as_usize()].state != TaskState::Suspended {
            return false;
        }
        self.tasks[idx.as_usize()].state = TaskState::Ready;
        let p = self.tasks[idx.as_usize()].priority;
        self.ready[p.as_usize()].insert(&mut self.tasks, idx);
        true
    }

    /// Rotates `idx` (must currently be the head of its ready band, i.e.
    /// the running task) to the tail of its band. Returns the new head.
    pub fn yield_now(&mut self, idx: TaskIndex) -> Option<TaskIndex> {
        let _guard = self.lock.enter();
        let p = self.tasks[idx.as_usize()].priority.as_usize();
        if self.ready[p].remove(&mut self.tasks, idx) {
            self.ready[p].insert(&mut self.tasks, idx);
        }
        self.pick()
    }

    /// Joins `target`: if it is already dormant, returns `false`
    /// immediately (no wait needed). Otherwise enlists `joiner` and returns
    /// `true`; `joiner`'s outcome becomes [`Outcome::Success`] once `target`
    /// stops.
    pub fn join(&mut self, target: TaskIndex, joiner: TaskIndex) -> bool {
        let _guard = self.lock.enter();
        if self.tasks[target.as_usize()].state == TaskState::Dormant {
            return false;
        }
        self.tasks[joiner.as_usize()].state = TaskState::Blocked;
        let joiners: *mut WaiterQueue = &mut self.tasks[target.as_usize()].joiners;
        self.tasks[joiner.as_usize()].waitq = Some(NonNull::new(joiners).unwrap());
        // SAFETY: `joiners` points at `target`'s slot in this scheduler's
        // own task pool, which outlives `joiner`'s wait regardless of how
        // it ends; a task cannot meaningfully join itself, so this does
        // not alias `tasks[joiner]`.
        unsafe { (*joiners).insert(&mut self.tasks, joiner) };
        true
    }

    /// Enlists `idx` into `obj`'s waiter queue, blocking it for up to
    /// `delay` ticks.
    ///
    /// # Panics (debug)
    ///
    /// Panics if called while [`Scheduler::set_in_isr`] is active — blocking
    /// calls are forbidden from interrupt context.
    pub fn enlist<W: Waitable>(&mut self, obj: &mut W, idx: TaskIndex, delay: Duration) -> Enlist {
        crate::assert_unsafe_precondition!(!self.in_isr, "blocking call from interrupt context");
        let _guard = self.lock.enter();
        if delay.is_immediate() {
            self.tasks[idx.as_usize()].outcome = Outcome::Timeout;
            return Enlist::Immediate;
        }
        let header = obj.header_mut();
        let Self { tasks, .. } = self;
        header.waiters.insert(tasks, idx);
        tasks[idx.as_usize()].waitq = Some(NonNull::from(&mut header.waiters));
        match delay {
            Duration::Infinite => {
                tasks[idx.as_usize()].state = TaskState::Blocked;
            }
            Duration::Ticks(n) => {
                tasks[idx.as_usize()].state = TaskState::Delayed;
                tasks[idx.as_usize()].deadline = self.now.wrapping_add(Duration::Ticks(n));
                self.timers.insert_tail(tasks, idx);
            }
        }
        Enlist::Blocked
    }

    /// Wakes the head of `obj`'s waiter queue with `outcome`, moving it
    /// back to `Ready`. Returns the woken task, if any.
    ///
    /// Use [`Scheduler::wake_one_with`] instead when the wake also hands a
    /// [`Scratch`] payload to the woken task — the stamp must land inside
    /// the same critical section as the wake, not a second one taken after
    /// this method returns.
    pub fn wake_one<W: Waitable>(&mut self, obj: &mut W, outcome: Outcome) -> Option<TaskIndex> {
        let _guard = self.lock.enter();
        let header = obj.header_mut();
        let Self { tasks, ready, .. } = self;
        let idx = header.waiters.pop_front(tasks)?;
        self.timers.remove(tasks, idx);
        tasks[idx.as_usize()].waitq = None;
        tasks[idx.as_usize()].outcome = outcome;
        tasks[idx.as_usize()].state = TaskState::Ready;
        ready[tasks[idx.as_usize()].priority.as_usize()].insert(tasks, idx);
        crate::trace!(TaskWoken(idx, outcome));
        Some(idx)
    }

    /// Like [`Scheduler::wake_one`], but also stamps `scratch` on the woken
    /// task before the lock is released, so a direct producer-to-consumer
    /// hand-off is atomic with the wake: the woken task can never observe
    /// itself `Ready` with a stale scratch value.
    pub fn wake_one_with<W: Waitable>(&mut self, obj: &mut W, outcome: Outcome, scratch: Scratch) -> Option<TaskIndex> {
        let _guard = self.lock.enter();
        let header = obj.header_mut();
        let Self { tasks, ready, .. } = self;
        let idx = header.waiters.pop_front(tasks)?;
        self.timers.remove(tasks, idx);
        tasks[idx.as_usize()].waitq = None;
        tasks[idx.as_usize()].outcome = outcome;
        tasks[idx.as_usize()].scratch = scratch;
        tasks[idx.as_usize()].state = TaskState::Ready;
        ready[tasks[idx.as_usize()].priority.as_usize()].insert(tasks, idx);
        crate::trace!(TaskWoken(idx, outcome));
        Some(idx)
    }

    /// Wakes every waiter on `obj` with `outcome`.
    pub fn wake_all<W: Waitable>(&mut self, obj: &mut W, outcome: Outcome) {
        while self.wake_one(obj, outcome).is_some() {}
    }

    /// Like [`Scheduler::wake_one`] but over a bare [`WaiterQueue`] rather
    /// than a [`Waitable`] object.
    ///
    /// Used for a primitive's secondary waiter queue that has no object
    /// header of its own — e.g. a job queue's producer side, blocked on
    /// *full* rather than on the consumer-facing [`ObjectHeader`].
    pub fn wake_one_raw(&mut self, wq: &mut WaiterQueue, outcome: Outcome) -> Option<TaskIndex> {
        let _guard = self.lock.enter();
        let Self { tasks, ready, .. } = self;
        let idx = wq.pop_front(tasks)?;
        self.timers.remove(tasks, idx);
        tasks[idx.as_usize()].waitq = None;
        tasks[idx.as_usize()].outcome = outcome;
        tasks[idx.as_usize()].state = TaskState::Ready;
        ready[tasks[idx.as_usize()].priority.as_usize()].insert(tasks, idx);
        crate::trace!(TaskWoken(idx, outcome));
        Some(idx)
    }

    /// Scans `obj`'s waiter queue from head to tail for the first task
    /// whose [`Scratch`] satisfies `matches`, and atomically removes,
    /// readies, and stamps it with `outcome`/`scratch` before the lock is
    /// released. Returns its index.
    ///
    /// Used where a wake must be conditional on what a waiter is actually
    /// waiting for (a signal set waking only waiters whose mask matches
    /// the signal just given), unlike the strict head-only [`Scheduler::wake_one`].
    pub fn wake_where<W, F>(&mut self, obj: &mut W, outcome: Outcome, scratch: Scratch, mut matches: F) -> Option<TaskIndex>
    where
        W: Waitable,
        F: FnMut(Scratch) -> bool,
    {
        let _guard = self.lock.enter();
        let header = obj.header_mut();
        let Self { tasks, ready, .. } = self;
        let mut cursor = header.waiters.peek_front();
        while let Some(c) = cursor {
            let next = tasks[c.as_usize()].next;
            if matches(tasks[c.as_usize()].scratch) {
                header.waiters.remove(tasks, c);
                self.timers.remove(tasks, c);
                tasks[c.as_usize()].waitq = None;
                tasks[c.as_usize()].state = TaskState::Ready;
                tasks[c.as_usize()].outcome = outcome;
                tasks[c.as_usize()].scratch = scratch;
                ready[tasks[c.as_usize()].priority.as_usize()].insert(tasks, c);
                crate::trace!(TaskWoken(c, outcome));
                return Some(c);
            }
            cursor = next;
        }
        None
    }

    /// Advances the tick count by one and expires any `Delayed` task whose
    /// deadline has been reached, waking it with [`Outcome::Timeout`].
    ///
    /// Tasks whose deadlines coincide fire in enlistment order: the timer
    /// list is walked head to tail, which is exactly the order tasks were
    /// enlisted in (see [`TimerList`]).
    pub fn tick(&mut self) {
        let _guard = self.lock.enter();
        self.now = self.now.wrapping_add(Duration::Ticks(1));
        let mut due: [Option<TaskIndex>; N] = [None; N];
        let mut count = 0;
        let mut cursor = self.timers.head;
        while let Some(c) = cursor {
            cursor = self.tasks[c.as_usize()].timer_next;
            if self.tasks[c.as_usize()].state == TaskState::Delayed && self.now.has_reached(self.tasks[c.as_usize()].deadline) {
                due[count] = Some(c);
                count += 1;
            }
        }
        for slot in &due[..count] {
            if let Some(idx) = slot {
                self.expire(*idx);
            }
        }
    }

    /// Advances the tick count by `n`, expiring deadlines along the way.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    fn expire(&mut self, idx: TaskIndex) {
        self.timers.remove(&mut self.tasks, idx);
        let Self { tasks, .. } = self;
        if let Some(wq) = tasks[idx.as_usize()].waitq.take() {
            // SAFETY: the queue outlives any task enlisted in it — a
            // primitive's `destroy` wakes every waiter (clearing `waitq`)
            // before its storage is released.
            unsafe { (*wq.as_ptr()).remove(tasks, idx) };
        }
        tasks[idx.as_usize()].outcome = Outcome::Timeout;
        tasks[idx.as_usize()].state = TaskState::Ready;
        self.ready[tasks[idx.as_usize()].priority.as_usize()].insert(tasks, idx);
        crate::trace!(DeadlineExpired(idx));
    }

    /// Puts `idx` to sleep for `delay` ticks with no associated object;
    /// equivalent to enlisting in a private, never-signalled waiter queue.
    /// Returns `Enlist::Immediate` for `Duration::IMMEDIATE`.
    pub fn sleep_for(&mut self, sleepq: &mut WaiterQueue, idx: TaskIndex, delay: Duration) -> Enlist {
        crate::assert_unsafe_precondition!(!self.in_isr, "blocking call from interrupt context");
        let _guard = self.lock.enter();
        if delay.is_immediate() {
            self.tasks[idx.as_usize()].outcome = Outcome::Timeout;
            return Enlist::Immediate;
        }
        let Self { tasks, .. } = self;
        sleepq.insert(tasks, idx);
        tasks[idx.as_usize()].waitq = Some(NonNull::from(&mut *sleepq));
        match delay {
            Duration::Infinite => {
                tasks[idx.as_usize()].state = TaskState::Blocked;
            }
            Duration::Ticks(n) => {
                tasks[idx.as_usize()].state = TaskState::Delayed;
                tasks[idx.as_usize()].deadline = self.now.wrapping_add(Duration::Ticks(n));
                self.timers.insert_tail(tasks, idx);
            }
        }
        Enlist::Blocked
    }

    /// Removes `idx` from whatever queue currently holds it (ready band or
    /// waiter queue) without changing its state. Used by `stop`.
    fn unlink(&mut self, idx: TaskIndex) {
        let state = self.tasks[idx.as_usize()].state;
        match state {
            TaskState::Ready => {
                let p = self.tasks[idx.as_usize()].priority.as_usize();
                self.ready[p].remove(&mut self.tasks, idx);
            }
            TaskState::Blocked | TaskState::Delayed => {
                if state == TaskState::Delayed {
                    self.timers.remove(&mut self.tasks, idx);
                }
                let Self { tasks, .. } = self;
                if let Some(wq) = tasks[idx.as_usize()].waitq.take() {
                    // SAFETY: see `expire`.
                    unsafe { (*wq.as_ptr()).remove(tasks, idx) };
                }
            }
            TaskState::Dormant | TaskState::Running | TaskState::Suspended => {}
        }
    }
}

impl<const N: usize, const PRIOS: usize> Default for Scheduler<N, PRIOS> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectHeader;

    fn idx(i: u16) -> TaskIndex {
        TaskIndex::new(i)
    }

    #[test]
    fn start_makes_task_ready_and_pickable() {
        let mut s = Scheduler::<4, 3>::new();
        assert!(s.start(idx(0), Priority::new(1)));
        assert_eq!(s.state(idx(0)), TaskState::Ready);
        assert_eq!(s.pick(), Some(idx(0)));
    }

    #[test]
    fn start_twice_fails() {
        let mut s = Scheduler::<4, 3>::new();
        assert!(s.start(idx(0), Priority::new(1)));
        assert!(!s.start(idx(0), Priority::new(1)));
    }

    #[test]
    fn higher_priority_preempts_pick_order() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(2));
        s.start(idx(1), Priority::new(0));
        assert_eq!(s.pick(), Some(idx(1)));
    }

    #[test]
    fn yield_rotates_within_band() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(1));
        s.start(idx(1), Priority::new(1));
        assert_eq!(s.pick(), Some(idx(0)));
        let next = s.yield_now(idx(0));
        assert_eq!(next, Some(idx(1)));
        assert_eq!(s.pick(), Some(idx(1)));
    }

    #[test]
    fn enlist_immediate_returns_timeout_without_blocking() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(0));
        let mut obj = ObjectHeader::new_static();
        let r = s.enlist(&mut obj, idx(0), Duration::IMMEDIATE);
        assert_eq!(r, Enlist::Immediate);
        assert_eq!(s.outcome(idx(0)), Outcome::Timeout);
        assert_eq!(s.state(idx(0)), TaskState::Ready);
    }

    #[test]
    fn enlist_then_wake_one() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(0));
        let mut obj = ObjectHeader::new_static();
        let r = s.enlist(&mut obj, idx(0), Duration::INFINITE);
        assert_eq!(r, Enlist::Blocked);
        assert_eq!(s.state(idx(0)), TaskState::Blocked);
        let woken = s.wake_one(&mut obj, Outcome::Success);
        assert_eq!(woken, Some(idx(0)));
        assert_eq!(s.outcome(idx(0)), Outcome::Success);
        assert_eq!(s.state(idx(0)), TaskState::Ready);
    }

    #[test]
    fn timed_wait_expires_with_timeout() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(0));
        let mut obj = ObjectHeader::new_static();
        s.enlist(&mut obj, idx(0), Duration::Ticks(10));
        s.advance(9);
        assert_eq!(s.state(idx(0)), TaskState::Delayed);
        s.advance(1);
        assert_eq!(s.state(idx(0)), TaskState::Ready);
        assert_eq!(s.outcome(idx(0)), Outcome::Timeout);
        assert!(obj.header().waiters.is_empty());
    }

    #[test]
    fn stop_wakes_joiners_with_success() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(1));
        s.start(idx(1), Priority::new(1));
        assert!(s.join(idx(0), idx(1)));
        assert_eq!(s.state(idx(1)), TaskState::Blocked);
        s.stop(idx(0));
        assert_eq!(s.state(idx(0)), TaskState::Dormant);
        assert_eq!(s.state(idx(1)), TaskState::Ready);
        assert_eq!(s.outcome(idx(1)), Outcome::Success);
    }

    #[test]
    fn join_on_already_dormant_returns_false() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(1), Priority::new(1));
        assert!(!s.join(idx(0), idx(1)));
    }

    #[test]
    fn suspend_then_resume() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(1));
        assert!(s.suspend(idx(0)));
        assert_eq!(s.state(idx(0)), TaskState::Suspended);
        assert_eq!(s.pick(), None);
        assert!(s.resume(idx(0)));
        assert_eq!(s.pick(), Some(idx(0)));
    }

    #[test]
    fn stop_cancels_pending_wait() {
        let mut s = Scheduler::<4, 3>::new();
        s.start(idx(0), Priority::new(0));
        let mut obj = ObjectHeader::new_static();
        s.enlist(&mut obj, idx(0), Duration::INFINITE);
        s.stop(idx(0));
        assert_eq!(s.state(idx(0)), TaskState::Dormant);
        assert!(obj.header().waiters.is_empty());
    }
}
