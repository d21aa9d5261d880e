//! Intrusive FIFO waiter queue.
//!
//! Threaded through [`Task::next`](crate::task::Task::next) rather than
//! backed by a separate allocation — enlisting a task costs no allocation,
//! only a pointer write. Every primitive (signal set, job queue, list)
//! embeds one of these as its waiter-queue head.

use crate::id::TaskIndex;
use crate::task::{Task, TaskState};

/// A FIFO queue of blocked tasks, ordered by enlistment time with priority
/// breaking ties on insertion: a task inserts immediately before the first
/// already-queued task of strictly lower priority (a larger
/// [`Priority`](crate::task::Priority) value), and after everything at
/// least as urgent as itself.
#[derive(Debug, Clone, Copy)]
pub struct WaiterQueue {
    head: Option<TaskIndex>,
    tail: Option<TaskIndex>,
}

impl WaiterQueue {
    /// Creates a new, empty waiter queue.
    pub const fn new() -> Self {
        Self { head: None, tail: None }
    }

    /// Returns whether no task is enlisted.
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Enlists `idx` in priority order (see type docs).
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `idx` is already linked into some queue.
    pub fn insert(&mut self, pool: &mut [Task], idx: TaskIndex) {
        debug_assert!(pool[idx.as_usize()].next.is_none(), "task already enqueued");
        let priority = pool[idx.as_usize()].priority;

        let Some(mut cursor) = self.head else {
            pool[idx.as_usize()].next = None;
            self.head = Some(idx);
            self.tail = Some(idx);
            return;
        };

        let mut prev: Option<TaskIndex> = None;
        loop {
            if pool[cursor.as_usize()].priority > priority {
                break;
            }
            match pool[cursor.as_usize()].next {
                Some(next) => {
                    prev = Some(cursor);
                    cursor = next;
                }
                None => {
                    pool[idx.as_usize()].next = None;
                    pool[cursor.as_usize()].next = Some(idx);
                    self.tail = Some(idx);
                    return;
                }
            }
        }

        pool[idx.as_usize()].next = Some(cursor);
        match prev {
            Some(p) => pool[p.as_usize()].next = Some(idx),
            None => self.head = Some(idx),
        }
    }

    /// Removes and returns the head of the queue, if any.
    pub fn pop_front(&mut self, pool: &mut [Task]) -> Option<TaskIndex> {
        let idx = self.head?;
        self.head = pool[idx.as_usize()].next.take();
        if self.head.is_none() {
            self.tail = None;
        }
        Some(idx)
    }

    /// Returns the current head without removing it.
    pub const fn peek_front(&self) -> Option<TaskIndex> {
        self.head
    }

    /// Removes an arbitrary task from the queue, used to unlink a task
    /// whose timed wait expired or whose task-level `stop` was invoked.
    /// Returns whether `idx` was found and removed.
    pub fn remove(&mut self, pool: &mut [Task], idx: TaskIndex) -> bool {
        let mut cursor = self.head;
        let mut prev: Option<TaskIndex> = None;

        while let Some(c) = cursor {
            if c == idx {
                let next = pool[c.as_usize()].next.take();
                match prev {
                    Some(p) => pool[p.as_usize()].next = next,
                    None => self.head = next,
                }
                if self.tail == Some(c) {
                    self.tail = prev;
                }
                return true;
            }
            prev = Some(c);
            cursor = pool[c.as_usize()].next;
        }
        false
    }

    /// Wakes every enlisted task with `outcome`, draining the queue.
    pub fn wake_all<F: FnMut(TaskIndex)>(&mut self, pool: &mut [Task], mut wake: F) {
        while let Some(idx) = self.pop_front(pool) {
            pool[idx.as_usize()].state = TaskState::Ready;
            wake(idx);
        }
    }
}

impl Default for WaiterQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskId};

    fn pool(n: usize) -> Vec<Task> {
        (0..n).map(|i| Task::new(TaskId(i as u32), Priority::new(1))).collect()
    }

    #[test]
    fn fifo_order_same_priority() {
        let mut p = pool(3);
        let mut q = WaiterQueue::new();
        q.insert(&mut p, TaskIndex::new(0));
        q.insert(&mut p, TaskIndex::new(1));
        q.insert(&mut p, TaskIndex::new(2));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(0)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(1)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(2)));
        assert_eq!(q.pop_front(&mut p), None);
    }

    #[test]
    fn higher_priority_jumps_queue() {
        let mut p = pool(3);
        p[1].priority = Priority::new(0); // higher priority than the others
        let mut q = WaiterQueue::new();
        q.insert(&mut p, TaskIndex::new(0));
        q.insert(&mut p, TaskIndex::new(2));
        q.insert(&mut p, TaskIndex::new(1));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(1)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(0)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(2)));
    }

    #[test]
    fn remove_middle() {
        let mut p = pool(3);
        let mut q = WaiterQueue::new();
        q.insert(&mut p, TaskIndex::new(0));
        q.insert(&mut p, TaskIndex::new(1));
        q.insert(&mut p, TaskIndex::new(2));
        assert!(q.remove(&mut p, TaskIndex::new(1)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(0)));
        assert_eq!(q.pop_front(&mut p), Some(TaskIndex::new(2)));
    }

    #[test]
    fn remove_absent_returns_false() {
        let mut p = pool(2);
        let mut q = WaiterQueue::new();
        q.insert(&mut p, TaskIndex::new(0));
        assert!(!q.remove(&mut p, TaskIndex::new(1)));
    }

    #[test]
    fn wake_all_drains_and_marks_ready() {
        let mut p = pool(2);
        let mut q = WaiterQueue::new();
        q.insert(&mut p, TaskIndex::new(0));
        q.insert(&mut p, TaskIndex::new(1));
        let mut woken = Vec::new();
        q.wake_all(&mut p, |idx| woken.push(idx));
        assert_eq!(woken, vec![TaskIndex::new(0), TaskIndex::new(1)]);
        assert!(q.is_empty());
        assert_eq!(p[0].state, TaskState::Ready);
        assert_eq!(p[1].state, TaskState::Ready);
    }
}
