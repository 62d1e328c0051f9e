//! Sweep runner

use std::sync::Arc;

use anyhow::{Context, Result};
use crc_analysis::crc_random::resolve_seed;
use crc_analysis::crc_stats::ConsoleProgress;
use crc_analysis::{AnalysisRunner, ProgressSink, Seed};
use log::info;

use super::config::SweepFile;
use super::stats::{SweepResult, SweepRow};

pub struct SweepRunner {
    sweep: SweepFile,
    seed: Seed,
    sink: Arc<dyn ProgressSink>,
}

impl SweepRunner {
    /// Every point of the sweep reuses the same master seed, so the printed
    /// seed reproduces the whole table
    pub fn new(sweep: SweepFile, seed: Option<Seed>) -> Self {
        let seed = resolve_seed(seed.or(sweep.config.seed));
        Self {
            sweep,
            seed,
            sink: Arc::new(ConsoleProgress),
        }
    }

    #[allow(dead_code)]
    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn run(self) -> Result<SweepResult> {
        let mut rows = Vec::new();

        for mut config in self.sweep.points() {
            config.seed = Some(self.seed);
            let bit_errors = config.bit_error_count;
            info!("sweep point: {} error bits", bit_errors);

            let mut runner = AnalysisRunner::with_sink(config, Arc::clone(&self.sink))
                .with_context(|| format!("invalid configuration for {} error bits", bit_errors))?;
            let report = runner.run_cycle()?;

            rows.push(SweepRow {
                bit_errors,
                samples: report.totals.samples,
                collisions: report.totals.collisions,
                unchanged: report.totals.unchanged,
                samples_per_second: report.samples_per_second(),
            });
        }

        Ok(SweepResult {
            name: self
                .sweep
                .meta
                .name
                .clone()
                .unwrap_or_else(|| "Sweep".to_string()),
            algorithm: self.sweep.config.algorithm.clone(),
            seed_used: self.seed,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc_analysis::NoOpSink;

    fn sweep(yaml: &str) -> SweepFile {
        SweepFile::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn test_runs_every_point() {
        let file = sweep(
            "config:\n  algorithm: crc8\n  total_samples: 400\n  task_count: 4\n  threads: 2\nbit_errors: [0, 1, 2]\n",
        );
        let result = SweepRunner::new(file, Some([1u8; 32]))
            .with_sink(Arc::new(NoOpSink))
            .run()
            .unwrap();

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].bit_errors, 0);
        assert_eq!(result.rows[0].collisions, 0);
        // Any CRC catches every single-bit error
        assert_eq!(result.rows[1].collisions, 0);
        for row in &result.rows {
            assert_eq!(row.samples, 400);
        }
    }

    #[test]
    fn test_invalid_point_fails() {
        let file = sweep("config:\n  algorithm: crc8\n  total_samples: 2\n  task_count: 4\n");
        assert!(SweepRunner::new(file, None)
            .with_sink(Arc::new(NoOpSink))
            .run()
            .is_err());
    }
}
