//! A preemptive real-time kernel core: task scheduler, waiter-queue
//! protocol, signal set, job queue, and list primitive.
//!
//! The crate has no dynamic allocation on any hot path; every collection is
//! fixed-capacity and sized by const generics at the call site. Blocking
//! operations suspend the calling task by enlisting it in a primitive's
//! [`waitqueue::WaiterQueue`] and invoking the [`sched::Scheduler`]; waking a
//! task always stamps an [`outcome::Outcome`] that the caller receives when
//! it resumes.
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]

#[macro_use]
pub mod safety;
#[macro_use]
pub mod static_assert;
#[macro_use]
pub mod trace;

pub mod alloc;
pub mod cell;
pub mod collections;
pub mod id;
pub mod jobqueue;
pub mod list;
pub mod lock;
pub mod object;
pub mod outcome;
pub mod sched;
pub mod signal;
pub mod task;
pub mod time;
pub mod waitqueue;

pub use outcome::Outcome;
pub use sched::Scheduler;
pub use task::{Priority, TaskId};
pub use time::{Duration, Tick};
