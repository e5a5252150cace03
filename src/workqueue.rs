//! Worker-pool distribution of independent parsing work.
//!
//! The unit of parallelism is one per-CPU event stream: order matters
//! inside a stream, so a stream is parsed start-to-finish on one thread,
//! while different streams are independent and run concurrently. The queue
//! does not interpret event content.

use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{bail, Result};
use workerpool::thunk::{Thunk, ThunkWorker};
use workerpool::Pool;

use crate::errors::TraceError;

/// One independent, schedulable unit of parsing work.
pub trait WorkItem: Send {
    /// Execute to completion. An `Err` marks the whole run as failed but
    /// does not stop the remaining items.
    fn run(&mut self) -> Result<()>;
}

/// Queue of pending work items drained by a fixed-size worker pool.
pub struct WorkQueue {
    items: Vec<Box<dyn WorkItem>>,
    nr_workers: usize,
}

impl WorkQueue {
    /// A queue sized to the host's available parallelism.
    pub fn new() -> Self {
        let nr_workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self::with_workers(nr_workers)
    }

    /// A queue with an explicit worker count.
    pub fn with_workers(nr_workers: usize) -> Self {
        Self {
            items: Vec::new(),
            nr_workers: nr_workers.max(1),
        }
    }

    /// Enqueue one item. Items only run once [`WorkQueue::run`] is called.
    pub fn submit(&mut self, item: Box<dyn WorkItem>) {
        self.items.push(item);
    }

    pub fn nr_workers(&self) -> usize {
        self.nr_workers
    }

    pub fn pending(&self) -> usize {
        self.items.len()
    }

    /// Run every submitted item across the worker pool and block until all
    /// of them have executed exactly once.
    ///
    /// The shared error flag is sticky: once an item fails it stays set,
    /// the remaining items still run so that one bad stream does not starve
    /// the processing of independent streams, and the whole run reports
    /// failure. The flag lives under its own lock, separate from the pool's
    /// dispatch queue. The pending items are consumed; `run()` is not
    /// restartable mid-flight and offers no per-item cancellation.
    pub fn run(&mut self) -> Result<()> {
        let pool = Pool::<ThunkWorker<()>>::new(self.nr_workers);
        let error = Arc::new(Mutex::new(false));

        for mut item in self.items.drain(..) {
            let error = error.clone();
            pool.execute(Thunk::of(move || {
                if let Err(e) = item.run() {
                    eprintln!("Warning: work item failed: {e}");
                    *error.lock().unwrap() = true;
                }
            }));
        }
        pool.join();

        if *error.lock().unwrap() {
            bail!(TraceError::Parse);
        }
        Ok(())
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
