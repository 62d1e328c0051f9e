//! # crc_analysis - Empirical Checksum Collision Analysis
//!
//! Estimates the undetected-error probability of a CRC or checksum under a
//! random bit-error channel. Random messages are corrupted by a bit-flip
//! model, both versions are checksummed, and every sample where the message
//! changed but the checksum did not is counted as a collision.
//!
//! ## Core Components
//!
//! - **AnalysisRunner**: run-loop controller, one or endless cycles
//! - **TaskPool**: partitions the sample budget and runs tasks with a gated start
//! - **SamplingWorker**: per-task generate, corrupt, checksum, compare loop
//! - **GlobalStatistics**: lock-free counters merged from every worker
//! - **AlgorithmCatalog**: named CRC and XOR checksums behind `ChecksumProvider`
//!
//! ```no_run
//! use crc_analysis::{AnalysisRunner, RunConfig};
//!
//! let config = RunConfig {
//!     algorithm: "crc16_arc".to_string(),
//!     bit_error_count: 3,
//!     ..Default::default()
//! };
//!
//! let summary = AnalysisRunner::new(config)?.run()?;
//! summary.print_summary();
//! # Ok::<(), crc_analysis::AnalysisError>(())
//! ```

pub mod crc_checksum;
pub mod crc_config;
pub mod crc_error;
pub mod crc_error_model;
pub mod crc_interface;
pub mod crc_random;
pub mod crc_runner;
pub mod crc_scheduler;
pub mod crc_stats;
pub mod crc_worker;

// Re-export commonly used types
pub use crc_checksum::{AlgorithmCatalog, AlgorithmSpec, CatalogEntry};
pub use crc_config::{message_length_from_bytes, RunConfig};
pub use crc_error::{AnalysisError, AnalysisResult};
pub use crc_error_model::ErrorModel;
pub use crc_interface::{
    ChecksumProvider, Message, NoOpSink, ProgressSink, ProgressSnapshot, RandomSource,
    WorkerResult,
};
pub use crc_random::{format_seed_hex, parse_seed_hex, Seed, SeededRandom};
pub use crc_runner::AnalysisRunner;
pub use crc_scheduler::TaskPool;
pub use crc_stats::{CycleReport, GlobalStatistics, RunSummary};
pub use crc_worker::{SampleOutcome, SamplingWorker};
