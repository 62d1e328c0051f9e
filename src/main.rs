//! Command line front end for the collision estimator.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use crc_analysis::{
    message_length_from_bytes, parse_seed_hex, AlgorithmCatalog, AnalysisRunner, RunConfig, Seed,
};

/// Naive CRC analysis: a simple program for checking error detection.
#[derive(Debug, Parser)]
#[command(name = "crc-analysis", version, about)]
struct Cli {
    /// Checksum algorithm (see --show-crc-list)
    #[arg(short = 'c', long = "crc", default_value = "crc8")]
    crc: String,

    /// Size of each message in bytes (truncated to whole 32-bit words)
    #[arg(short = 'p', long = "message-data-size", default_value_t = 5)]
    message_data_size: usize,

    /// Perform error correction (not implemented, accepted for compatibility)
    #[arg(short = 'e', long = "error-correction")]
    error_correction: bool,

    /// Samples per cycle
    #[arg(short = 's', long = "samples", default_value_t = 1_000_000)]
    samples: u64,

    /// Number of tasks the samples are split across
    #[arg(short = 't', long = "tasks", default_value_t = 2000)]
    tasks: u32,

    /// Number of bit errors added to each message
    #[arg(short = 'b', long = "nr-of-error-bits", default_value_t = 1)]
    nr_of_error_bits: u32,

    /// Probability of each bit error being applied
    #[arg(short = 'P', long = "error-probability", default_value_t = 1.0)]
    error_probability: f32,

    /// Run forever
    #[arg(short = 'f', long = "forever")]
    forever: bool,

    /// List supported CRC and checksum algorithms
    #[arg(short = 'l', long = "show-crc-list")]
    show_crc_list: bool,

    /// Master seed as hex (random if omitted)
    #[arg(long, value_parser = parse_seed)]
    seed: Option<Seed>,

    /// Worker threads (defaults to logical CPU count)
    #[arg(long)]
    threads: Option<usize>,

    /// Load the run configuration from a YAML file instead of the flags above
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn parse_seed(hex: &str) -> Result<Seed, String> {
    parse_seed_hex(hex).ok_or_else(|| format!("invalid hex seed: {}", hex))
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        if let Some(ref path) = self.config {
            return RunConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()));
        }

        Ok(RunConfig {
            algorithm: self.crc.clone(),
            message_length: message_length_from_bytes(self.message_data_size),
            total_samples: self.samples,
            task_count: self.tasks,
            bit_error_count: self.nr_of_error_bits,
            error_probability: self.error_probability,
            repeat_forever: self.forever,
            seed: self.seed,
            threads: self.threads,
            error_correction: self.error_correction,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_crc_list {
        for name in AlgorithmCatalog::standard().names() {
            println!("{}", name);
        }
        return Ok(());
    }

    SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .context("failed to initialise logger")?;

    let config = cli.run_config()?;
    info!("starting");

    let runner = AnalysisRunner::new(config).context("invalid run configuration")?;
    let summary = runner.run().context("analysis run failed")?;
    summary.print_summary();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_match_defaults() {
        let cli = Cli::parse_from(["crc-analysis"]);
        let config = cli.run_config().unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from([
            "crc-analysis",
            "-c",
            "crc32_q",
            "-p",
            "16",
            "-s",
            "1000",
            "-t",
            "10",
            "-b",
            "3",
            "-P",
            "0.5",
            "-f",
            "--seed",
            "0xff",
        ]);
        let config = cli.run_config().unwrap();

        assert_eq!(config.algorithm, "crc32_q");
        assert_eq!(config.message_length, 4);
        assert_eq!(config.total_samples, 1000);
        assert_eq!(config.task_count, 10);
        assert_eq!(config.bit_error_count, 3);
        assert_eq!(config.error_probability, 0.5);
        assert!(config.repeat_forever);
        assert_eq!(config.seed.map(|s| s[0]), Some(0xff));
    }

    #[test]
    fn test_bad_seed_rejected() {
        assert!(Cli::try_parse_from(["crc-analysis", "--seed", "xyz"]).is_err());
    }
}
