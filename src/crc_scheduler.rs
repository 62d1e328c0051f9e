//! Task partitioning and gated-start scheduling
//!
//! One cycle submits every task to the worker pool, then opens a single-use
//! gate. Each task parks on the gate right before it signals completion, so
//! no task is counted as done until all of them have been released together.
//! The caller blocks on a countdown latch sized to the task count.
//!
//! Gate and latch are single-cycle objects: [`TaskPool::run_gated`] builds
//! fresh ones on every call.

use std::sync::Arc;

use log::debug;
use parking_lot::{Condvar, Mutex};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::crc_error::{AnalysisError, AnalysisResult};
use crate::crc_interface::{SampleCount, TaskCount};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

// ============================================================================
// Partitioning
// ============================================================================

/// Split the sample budget into `task_count` equal slices.
///
/// The remainder `total_samples % task_count` is dropped. A budget that
/// leaves zero samples per task is a configuration error.
pub fn partition(total_samples: SampleCount, task_count: TaskCount) -> AnalysisResult<Vec<SampleCount>> {
    if task_count == 0 {
        return Err(AnalysisError::invalid_config("task count must be positive"));
    }

    let per_task = total_samples / task_count as SampleCount;
    if per_task == 0 {
        return Err(AnalysisError::invalid_config(format!(
            "{} samples cannot be split across {} tasks",
            total_samples, task_count
        )));
    }

    Ok(vec![per_task; task_count as usize])
}

/// Samples lost to integer division
pub fn dropped_samples(total_samples: SampleCount, task_count: TaskCount) -> SampleCount {
    if task_count == 0 {
        return total_samples;
    }
    total_samples % task_count as SampleCount
}

// ============================================================================
// Synchronization
// ============================================================================

/// Open-once broadcast gate. Waiters block until [`Gate::open`] is called,
/// after which every current and future waiter passes immediately.
pub struct Gate {
    open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub fn new() -> Self {
        Self {
            open: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    pub fn open(&self) {
        let mut open = self.open.lock();
        *open = true;
        self.cond.notify_all();
    }

    pub fn wait(&self) {
        let mut open = self.open.lock();
        while !*open {
            self.cond.wait(&mut open);
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

/// Countdown barrier released when every participant has checked in
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    cond: Condvar,
}

impl CompletionLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            cond: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.cond.notify_all();
        }
    }

    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.cond.wait(&mut remaining);
        }
    }

    pub fn remaining(&self) -> usize {
        *self.remaining.lock()
    }
}

// ============================================================================
// Worker pool
// ============================================================================

/// Fixed-size worker pool, by default one thread per logical CPU.
pub struct TaskPool {
    pool: ThreadPool,
}

impl TaskPool {
    pub fn new(threads: Option<usize>) -> AnalysisResult<Self> {
        let mut builder =
            ThreadPoolBuilder::new().thread_name(|index| format!("crc-worker-{}", index));
        if let Some(threads) = threads {
            if threads == 0 {
                return Err(AnalysisError::invalid_config("thread count must be positive"));
            }
            builder = builder.num_threads(threads);
        }

        let pool = builder
            .build()
            .map_err(|e| AnalysisError::Scheduler(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run every job to completion with a synchronized release.
    ///
    /// Jobs may run in any order. A panicking job aborts the process (rayon's
    /// default for spawned work), so a cycle either completes fully or not at
    /// all.
    pub fn run_gated(&self, jobs: Vec<Job>) {
        let gate = Arc::new(Gate::new());
        let latch = Arc::new(CompletionLatch::new(jobs.len()));

        for job in jobs {
            let gate = Arc::clone(&gate);
            let latch = Arc::clone(&latch);
            self.pool.spawn(move || {
                job();
                gate.wait();
                latch.count_down();
            });
        }

        debug!("all tasks submitted, opening gate");
        gate.open();
        latch.wait();
    }
}
