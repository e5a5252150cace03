//! tracefields - field extraction for kernel scheduling and IRQ trace events.
//!
//! This library recovers typed fields (pids, priorities, CPU ids, task names,
//! scheduler states) from already-tokenized trace lines produced by the two
//! kernel trace front-end families, whose textual layouts diverged over
//! several kernel generations ("mainline" vs "distro" style, old vs new
//! field orders).
//!
//! # Modules
//!
//! - [`event`] - tokenized events, per-kind preconditions, unified dispatch
//! - [`sched`] - scheduler event extractors (switch, wakeup, migrate, fork, exit)
//! - [`irq`] - IRQ handler entry/exit extractors
//! - [`power`] - cpu-frequency and cpu-idle extractors
//! - [`taskstate`] - scheduler state-code decoding
//! - [`intern`] - deduplicating pool for extracted task names
//! - [`workqueue`] - worker-pool distribution of per-CPU parsing work
//! - [`errors`] - error kinds and their descriptions
//!
//! Extractors never panic on malformed field content. A numeric field that
//! cannot be recovered comes back as [`ABSURD_INT`] / [`ABSURD_UNSIGNED`],
//! and a name field comes back as the pool's placeholder name. Downstream
//! code must treat these as "no usable value".

pub mod errors;
pub mod event;
pub mod intern;
pub mod irq;
mod params;
pub mod power;
pub mod sched;
pub mod taskstate;
pub mod workqueue;

pub use errors::{strerror, TraceError, PARSE_ERROR_NAME};
pub use event::{extract, EventFields, EventKind, TokenizedEvent};
pub use intern::{InternedName, NamePool};
pub use sched::SwitchHandle;
pub use taskstate::TaskState;
pub use workqueue::{WorkItem, WorkQueue};

/// Sentinel for a signed numeric field that could not be extracted.
pub const ABSURD_INT: i32 = i32::MIN;

/// Sentinel for an unsigned numeric field that could not be extracted.
pub const ABSURD_UNSIGNED: u32 = u32::MAX;

/// Upper bound, in bytes, on a reconstructed task name. Reconstruction that
/// would exceed this fails with the placeholder name instead of truncating.
pub const TASKNAME_MAXLEN: usize = 64;
