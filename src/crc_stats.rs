// Shared counters, progress reporting and run results

use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use crate::crc_interface::{
    ProgressSink, ProgressSnapshot, SampleCount, TaskCount, WorkerResult,
};
use crate::crc_random::{format_seed_hex, Seed};

// ============================================================================
// Global Statistics
// ============================================================================

/// Per-cycle counters shared by every worker.
///
/// Only ever incremented. Writers add `samples` before `collisions` and
/// `unchanged`; readers load `collisions` and `unchanged` before `samples`.
/// With sequentially consistent ordering every snapshot therefore satisfies
/// `collisions + unchanged <= samples`, even mid-cycle.
#[derive(Debug)]
pub struct GlobalStatistics {
    task_count: TaskCount,
    samples: AtomicU64,
    collisions: AtomicU64,
    unchanged: AtomicU64,
    flipped_bits: AtomicU64,
    completed_tasks: AtomicU32,
}

impl GlobalStatistics {
    pub fn new(task_count: TaskCount) -> Self {
        Self {
            task_count,
            samples: AtomicU64::new(0),
            collisions: AtomicU64::new(0),
            unchanged: AtomicU64::new(0),
            flipped_bits: AtomicU64::new(0),
            completed_tasks: AtomicU32::new(0),
        }
    }

    /// Merge one task's result and return the snapshot to report.
    ///
    /// Must be called exactly once per task.
    pub fn record(&self, result: &WorkerResult) -> ProgressSnapshot {
        self.samples.fetch_add(result.samples, Ordering::SeqCst);
        self.collisions.fetch_add(result.collisions, Ordering::SeqCst);
        self.unchanged.fetch_add(result.unchanged, Ordering::SeqCst);
        self.flipped_bits
            .fetch_add(result.flipped_bits, Ordering::SeqCst);
        let completed = self.completed_tasks.fetch_add(1, Ordering::SeqCst) + 1;

        let mut snapshot = self.snapshot();
        snapshot.completed_tasks = snapshot.completed_tasks.max(completed);
        snapshot
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let collisions = self.collisions.load(Ordering::SeqCst);
        let unchanged = self.unchanged.load(Ordering::SeqCst);
        let completed_tasks = self.completed_tasks.load(Ordering::SeqCst);
        let samples = self.samples.load(Ordering::SeqCst);

        ProgressSnapshot {
            completed_tasks,
            task_count: self.task_count,
            samples,
            collisions,
            unchanged,
        }
    }

    pub fn flipped_bits(&self) -> u64 {
        self.flipped_bits.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Progress Reporting
// ============================================================================

pub fn format_progress_line(algorithm: &str, snapshot: &ProgressSnapshot, bit_errors: u32) -> String {
    format!(
        "CRC: {}, [{}/{}] samples: {}, collisions: {} fraction: {:.9} - error bits: {}",
        algorithm,
        snapshot.completed_tasks,
        snapshot.task_count,
        snapshot.samples,
        snapshot.collisions,
        snapshot.collision_fraction(),
        bit_errors
    )
}

/// Single refreshing line on stdout, rewritten with `\r` after every task.
///
/// Lines from concurrent workers may overwrite one another; each one is a
/// consistent snapshot.
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, algorithm: &str, snapshot: &ProgressSnapshot, bit_errors: u32) {
        let line = format_progress_line(algorithm, snapshot, bit_errors);
        let mut out = std::io::stdout().lock();
        // Console output is best effort
        let _ = write!(out, "\r{}", line);
        let _ = out.flush();
    }

    fn finish(&self) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out);
        let _ = out.flush();
    }
}

// ============================================================================
// Results
// ============================================================================

/// Result of one completed cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Cycle number, starting at 1
    pub cycle: u64,

    /// Final counters, equal to the sum over all tasks
    pub totals: ProgressSnapshot,

    pub flipped_bits: u64,

    /// Budget lost to integer division
    pub dropped_samples: SampleCount,

    pub elapsed: Duration,
}

impl CycleReport {
    pub fn collision_fraction(&self) -> f64 {
        self.totals.collision_fraction()
    }

    pub fn samples_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.totals.samples as f64 / secs
        } else {
            0.0
        }
    }

    /// Average number of bits that actually differ per sample
    pub fn mean_flipped_bits(&self) -> f64 {
        if self.totals.samples == 0 {
            0.0
        } else {
            self.flipped_bits as f64 / self.totals.samples as f64
        }
    }
}

/// Totals carried across cycles when repeating
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CumulativeStats {
    pub cycles: u64,
    pub samples: SampleCount,
    pub collisions: SampleCount,
    pub unchanged: SampleCount,
}

impl CumulativeStats {
    pub fn add(&mut self, report: &CycleReport) {
        self.cycles += 1;
        self.samples += report.totals.samples;
        self.collisions += report.totals.collisions;
        self.unchanged += report.totals.unchanged;
    }

    pub fn collision_fraction(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.collisions as f64 / self.samples as f64
        }
    }
}

/// Complete run result
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub algorithm: String,
    pub checksum_width: u32,
    pub bit_errors: u32,
    pub error_probability: f32,
    pub seed_used: Seed,
    pub last_cycle: CycleReport,
    pub cumulative: CumulativeStats,
}

impl RunSummary {
    /// Print a summary of the run
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║        CRC Collision Analysis Results                 ║");
        println!("╚════════════════════════════════════════════════════════╝\n");

        println!("Configuration:");
        println!("  Algorithm: {} ({} bits)", self.algorithm, self.checksum_width);
        println!("  Error bits: {}", self.bit_errors);
        println!("  Error probability: {}", self.error_probability);
        println!("  Seed: {}", format_seed_hex(&self.seed_used));
        println!();

        let last = &self.last_cycle;
        println!("Last cycle ({}):", last.cycle);
        println!("  Samples: {}", last.totals.samples);
        println!("  Collisions: {}", last.totals.collisions);
        println!("  Unchanged: {}", last.totals.unchanged);
        println!("  Collision fraction: {:.9}", last.collision_fraction());
        println!("  Mean flipped bits: {:.3}", last.mean_flipped_bits());
        if last.dropped_samples > 0 {
            println!("  Dropped samples: {}", last.dropped_samples);
        }
        println!(
            "  Elapsed: {:.2}s ({:.0} samples/s)",
            last.elapsed.as_secs_f64(),
            last.samples_per_second()
        );
        println!();

        if self.cumulative.cycles > 1 {
            println!("All cycles ({}):", self.cumulative.cycles);
            println!("  Samples: {}", self.cumulative.samples);
            println!("  Collisions: {}", self.cumulative.collisions);
            println!(
                "  Collision fraction: {:.9}",
                self.cumulative.collision_fraction()
            );
            println!();
        }
    }
}
