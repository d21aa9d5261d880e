//! Task control block and the task-local hand-off slot.

use core::ptr::NonNull;

use crate::id::TaskIndex;
use crate::outcome::Outcome;
use crate::time::Tick;
use crate::waitqueue::WaiterQueue;

/// Unique task identifier (stable across the task's lifetime; distinct from
/// its transient pool index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u32);

/// Task priority. Lower numeric value preempts higher; `0` is the highest
/// priority band a [`Scheduler`](crate::sched::Scheduler) supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Priority(pub u8);

impl Priority {
    /// Creates a new `Priority`.
    pub const fn new(val: u8) -> Self {
        Self(val)
    }

    /// Returns the raw band index.
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Scheduling state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Not yet started, or stopped.
    Dormant,
    /// Eligible to run, waiting in a ready-queue band.
    Ready,
    /// Currently executing.
    Running,
    /// Blocked in a waiter queue with no deadline.
    Blocked,
    /// Blocked in a waiter queue with a deadline.
    Delayed,
    /// Administratively suspended; not eligible to run even if otherwise
    /// ready.
    Suspended,
}

/// A tagged hand-off slot threaded through the critical section under which
/// a task blocks and is later woken.
///
/// The source's C union is keyed implicitly by call-site context; this is
/// the explicit sum-typed equivalent. The primitive a task blocks on
/// determines which variant is legal to read when the task is woken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scratch {
    /// No hand-off is pending.
    None,
    /// This task is a consumer waiting to receive a `usize`-sized payload
    /// (a job-queue entry or a list-node pointer) at the given address.
    ConsumerSlot(*mut usize),
    /// This task is a producer offering a `usize`-sized payload for a
    /// waiting consumer to take directly.
    ProducerValue(usize),
    /// This task is waiting on a signal set for any bit in this mask.
    SignalMask(u32),
}

// SAFETY: the raw pointer in `ConsumerSlot` is only ever dereferenced by the
// waker while holding the kernel's critical section, which already
// synchronises access to the task pool this value lives in.
unsafe impl Send for Scratch {}

/// A kernel task control block.
///
/// Tasks live in a fixed-capacity pool owned by a
/// [`Scheduler`](crate::sched::Scheduler). `next` threads the task through
/// exactly one of: a ready-queue band, a waiter queue, or neither — never
/// both, since a task is never simultaneously ready and blocked.
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// Scheduling priority.
    pub priority: Priority,
    /// Current state.
    pub state: TaskState,
    /// Intrusive link to the next task in whichever queue currently owns
    /// this task (ready-queue band or waiter queue), if any.
    pub next: Option<TaskIndex>,
    /// Back-pointer to the waiter queue this task is enlisted in, if any.
    /// Lets the timed-wait engine unlink a timed-out task without static
    /// knowledge of which primitive it was waiting on.
    pub waitq: Option<NonNull<WaiterQueue>>,
    /// Absolute deadline for a timed wait. Only meaningful while
    /// `state == TaskState::Delayed`.
    pub deadline: Tick,
    /// Intrusive link in the scheduler's deadline-order timer list, kept
    /// separate from `next` since a timed waiter is linked into both its
    /// primitive's waiter queue (priority order) and this list (enlistment
    /// order) at once.
    pub timer_next: Option<TaskIndex>,
    /// Hand-off slot used by the waker to deliver a payload or a signal
    /// number when this task resumes.
    pub scratch: Scratch,
    /// Outcome stamped by whoever wakes this task; read by the task when it
    /// resumes from a blocking call.
    pub outcome: Outcome,
    /// Tasks blocked in `join` on this task's termination.
    pub joiners: WaiterQueue,
}

impl Task {
    /// Creates a new dormant task with no pending wait.
    pub const fn new(id: TaskId, priority: Priority) -> Self {
        Self {
            id,
            priority,
            state: TaskState::Dormant,
            next: None,
            waitq: None,
            deadline: Tick::ZERO,
            timer_next: None,
            scratch: Scratch::None,
            outcome: Outcome::Success,
            joiners: WaiterQueue::new(),
        }
    }
}
