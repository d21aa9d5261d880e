//! List primitive: a FIFO of externally-owned, singly-linked nodes.
//!
//! Unlike the job queue's ring buffer, a list owns no storage of its own —
//! every node lives in caller-provided memory (a static, or a frame on a
//! task's stack that outlives the node's time in the list) and is linked
//! in by pointer. `take` follows the same direct producer-to-consumer
//! hand-off as the job queue: if a consumer is already blocked, `give`
//! delivers the node straight to it without ever touching the list.

use core::ptr::NonNull;

use crate::object::{ObjectHeader, Storage, Waitable};
use crate::outcome::Outcome;
use crate::sched::{Enlist, Scheduler};
use crate::task::{Scratch, TaskIndex};
use crate::time::Duration;

/// A singly-linked node. The caller owns the storage this lives in and
/// must not move or drop it while linked into a [`List`] or handed off to
/// a blocked consumer.
pub struct ListNode {
    next: Option<NonNull<ListNode>>,
    /// Caller-defined payload, typically a pointer or index into the
    /// caller's own data cast to `usize`.
    pub value: usize,
}

impl ListNode {
    /// Creates a new, unlinked node carrying `value`.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self { next: None, value }
    }
}

crate::static_assert!(
    core::mem::size_of::<*mut ListNode>() == core::mem::size_of::<usize>(),
    "a node pointer must round-trip through Scratch::ProducerValue's usize slot"
);

/// Result of starting a blocking [`List::take`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStart {
    /// Resolved from the fast path: the outcome, and the node received on
    /// success.
    Resolved(Outcome, Option<NonNull<ListNode>>),
    /// Enlisted as a consumer; the caller must read the final result later
    /// via [`List::resolve`].
    Blocked,
}

/// A FIFO queue of externally-owned nodes.
pub struct List {
    header: ObjectHeader,
    head: Option<NonNull<ListNode>>,
    tail: Option<NonNull<ListNode>>,
}

// SAFETY: a `List`'s node pointers are only ever dereferenced while the
// owning scheduler's critical section is held, same as `Scratch`'s
// `ConsumerSlot`.
unsafe impl Send for List {}

impl Waitable for List {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }
}

impl List {
    /// Creates a statically-backed, empty list.
    #[must_use]
    pub const fn new_static() -> Self {
        Self { header: ObjectHeader::new_static(), head: None, tail: None }
    }

    /// Creates a dynamically-backed list (see [`ObjectHeader::new_dynamic`]).
    #[must_use]
    pub const fn new_dynamic() -> Self {
        Self { header: ObjectHeader::new_dynamic(), head: None, tail: None }
    }

    /// Whether the list holds no linked nodes (ignores any task currently
    /// blocked in [`List::take`]).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn push_back(&mut self, mut node: NonNull<ListNode>) {
        // SAFETY: the caller guarantees `node` points at live storage that
        // is not already linked into this or any other list.
        unsafe {
            node.as_mut().next = None;
        }
        match self.tail {
            // SAFETY: `tail` is always a live node previously linked in by
            // this same function.
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
            None => self.head = Some(node),
        }
        self.tail = Some(node);
    }

    fn pop_front(&mut self) -> Option<NonNull<ListNode>> {
        let node = self.head?;
        // SAFETY: `node` is a live node previously linked in by `push_back`.
        let next = unsafe { node.as_ref().next };
        self.head = next;
        if next.is_none() {
            self.tail = None;
        }
        Some(node)
    }

    /// Gives `node` to the list.
    ///
    /// Hands it directly to the longest-waiting consumer if one is
    /// blocked in [`List::take`]; otherwise links it onto the tail.
    pub fn give<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>, node: NonNull<ListNode>) {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released list");
        let scratch = Scratch::ProducerValue(node.as_ptr() as usize);
        if sched.wake_one_with(&mut self.header, Outcome::Success, scratch).is_some() {
            return;
        }
        self.push_back(node);
    }

    /// Blocking take: removes and returns the head node if one is linked.
    /// On a fast-path miss, enlists the calling task (`idx`) as a consumer
    /// for up to `delay` ticks.
    pub fn take<const M: usize, const PRIOS: usize>(
        &mut self,
        sched: &mut Scheduler<M, PRIOS>,
        idx: TaskIndex,
        delay: Duration,
    ) -> WaitStart {
        crate::assert_unsafe_precondition!(self.header.alive, "operation on a released list");
        if let Some(node) = self.pop_front() {
            return WaitStart::Resolved(Outcome::Success, Some(node));
        }
        sched.set_scratch(idx, Scratch::None);
        match sched.enlist(&mut self.header, idx, delay) {
            Enlist::Immediate => WaitStart::Resolved(Outcome::Timeout, None),
            Enlist::Blocked => WaitStart::Blocked,
        }
    }

    /// Reads the final result of a take started by [`List::take`] that
    /// returned [`WaitStart::Blocked`], once the caller knows the task has
    /// since been woken.
    #[must_use]
    pub fn resolve<const M: usize, const PRIOS: usize>(
        sched: &Scheduler<M, PRIOS>,
        idx: TaskIndex,
    ) -> (Outcome, Option<NonNull<ListNode>>) {
        let outcome = sched.outcome(idx);
        let node = match (outcome, sched.scratch(idx)) {
            (Outcome::Success, Scratch::ProducerValue(raw)) => NonNull::new(raw as *mut ListNode),
            _ => None,
        };
        (outcome, node)
    }

    /// Wakes every waiting consumer with [`Outcome::Stopped`]. Any nodes
    /// already linked in remain linked.
    pub fn reset<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Stopped);
    }

    /// Wakes every waiting consumer with [`Outcome::Deleted`] and marks the
    /// list released.
    pub fn destroy<const M: usize, const PRIOS: usize>(&mut self, sched: &mut Scheduler<M, PRIOS>) {
        sched.wake_all(&mut self.header, Outcome::Deleted);
        self.header.alive = false;
    }

    /// Whether this list's header was allocated dynamically.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self.header.storage, Storage::Dynamic)
    }
}
