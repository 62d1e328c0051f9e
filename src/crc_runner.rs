//! Run-loop controller
//!
//! A run is a sequence of cycles. Each cycle partitions the sample budget,
//! submits one sampling task per slice to the pool, releases them through the
//! gate and blocks until the completion latch drops to zero. Counters, gate
//! and latch are fresh for every cycle. With `repeat_forever` the controller
//! goes straight back into the next cycle; there is no cancellation.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::crc_checksum::AlgorithmCatalog;
use crate::crc_config::RunConfig;
use crate::crc_error::AnalysisResult;
use crate::crc_error_model::ErrorModel;
use crate::crc_interface::{ChecksumProvider, ProgressSink};
use crate::crc_random::{derive_task_seeds, format_seed_hex, resolve_seed, Seed, SeededRandom};
use crate::crc_scheduler::{dropped_samples, partition, Job, TaskPool};
use crate::crc_stats::{ConsoleProgress, CumulativeStats, CycleReport, GlobalStatistics, RunSummary};
use crate::crc_worker::SamplingWorker;

pub struct AnalysisRunner {
    config: RunConfig,
    provider: Arc<dyn ChecksumProvider>,
    sink: Arc<dyn ProgressSink>,
    pool: TaskPool,
    master_rng: StdRng,
    seed: Seed,
    cumulative: CumulativeStats,
}

impl AnalysisRunner {
    /// Validate the configuration and build a runner reporting to the console
    pub fn new(config: RunConfig) -> AnalysisResult<Self> {
        Self::with_sink(config, Arc::new(ConsoleProgress))
    }

    pub fn with_sink(config: RunConfig, sink: Arc<dyn ProgressSink>) -> AnalysisResult<Self> {
        let catalog = AlgorithmCatalog::standard();
        config.validate(&catalog)?;

        let provider = catalog.provider(&config.algorithm)?;
        let pool = TaskPool::new(config.threads)?;
        let seed = resolve_seed(config.seed);

        if config.error_correction {
            warn!("error correction is not implemented; the flag has no effect");
        }
        if config.bit_error_count == 0 || config.error_probability == 0.0 {
            warn!("no bit errors will be injected; collisions will always be 0");
        }
        let dropped = dropped_samples(config.total_samples, config.task_count);
        if dropped > 0 {
            warn!(
                "{} samples do not divide evenly across {} tasks; {} dropped per cycle",
                config.total_samples, config.task_count, dropped
            );
        }

        info!(
            "{} ({} bits): {} words/message, {} samples over {} tasks on {} threads",
            provider.name(),
            provider.width(),
            config.message_length,
            config.total_samples,
            config.task_count,
            pool.threads()
        );
        info!("seed: {}", format_seed_hex(&seed));

        Ok(Self {
            config,
            provider,
            sink,
            pool,
            master_rng: StdRng::from_seed(seed),
            seed,
            cumulative: CumulativeStats::default(),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn cumulative(&self) -> CumulativeStats {
        self.cumulative
    }

    /// Run one full partition, schedule, release, aggregate cycle
    pub fn run_cycle(&mut self) -> AnalysisResult<CycleReport> {
        let cycle = self.cumulative.cycles + 1;
        let slices = partition(self.config.total_samples, self.config.task_count)?;
        let seeds = derive_task_seeds(&mut self.master_rng, slices.len());
        let stats = Arc::new(GlobalStatistics::new(self.config.task_count));
        let model = ErrorModel::new(self.config.bit_error_count, self.config.error_probability);

        debug!("cycle {}: scheduling {} tasks", cycle, slices.len());

        let jobs: Vec<Job> = slices
            .into_iter()
            .zip(seeds)
            .enumerate()
            .map(|(task, (samples, seed))| {
                let provider = Arc::clone(&self.provider);
                let sink = Arc::clone(&self.sink);
                let stats = Arc::clone(&stats);
                let message_length = self.config.message_length;

                Box::new(move || {
                    let mut rng = SeededRandom::from_seed(seed);
                    let mut worker = SamplingWorker::new(Arc::clone(&provider), model, message_length);
                    let result = worker.run(samples, &mut rng);

                    let snapshot = stats.record(&result);
                    debug!(
                        "task {} done: {} samples, {} collisions",
                        task, result.samples, result.collisions
                    );
                    sink.report(provider.name(), &snapshot, model.bit_errors());
                }) as Job
            })
            .collect();

        let started = Instant::now();
        self.pool.run_gated(jobs);
        let elapsed = started.elapsed();
        self.sink.finish();

        let report = CycleReport {
            cycle,
            totals: stats.snapshot(),
            flipped_bits: stats.flipped_bits(),
            dropped_samples: dropped_samples(self.config.total_samples, self.config.task_count),
            elapsed,
        };
        self.cumulative.add(&report);

        info!(
            "cycle {} complete: {} samples, {} collisions ({:.9}) in {:.2}s",
            cycle,
            report.totals.samples,
            report.totals.collisions,
            report.collision_fraction(),
            elapsed.as_secs_f64()
        );
        if self.cumulative.cycles > 1 {
            info!(
                "all cycles: {} samples, {} collisions ({:.9})",
                self.cumulative.samples,
                self.cumulative.collisions,
                self.cumulative.collision_fraction()
            );
        }

        Ok(report)
    }

    /// Run one cycle, or cycles forever when `repeat_forever` is set
    pub fn run(mut self) -> AnalysisResult<RunSummary> {
        loop {
            let last_cycle = self.run_cycle()?;
            if !self.config.repeat_forever {
                return Ok(self.summary(last_cycle));
            }
        }
    }

    fn summary(&self, last_cycle: CycleReport) -> RunSummary {
        RunSummary {
            algorithm: self.provider.name().to_string(),
            checksum_width: self.provider.width(),
            bit_errors: self.config.bit_error_count,
            error_probability: self.config.error_probability,
            seed_used: self.seed,
            last_cycle,
            cumulative: self.cumulative,
        }
    }
}
