//! Run configuration

use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::crc_checksum::AlgorithmCatalog;
use crate::crc_error::{AnalysisError, AnalysisResult};
use crate::crc_interface::{SampleCount, TaskCount, WORD_BYTES};
use crate::crc_random::{parse_seed_hex, Seed};

/// Configuration for one analysis run. Immutable once the run starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Catalog name of the checksum under test
    pub algorithm: String,

    /// Message length in 32-bit words
    pub message_length: usize,

    /// Sample budget per cycle
    pub total_samples: SampleCount,

    /// Number of equal-sized tasks the budget is split into
    pub task_count: TaskCount,

    /// Independent bit-flip trials per sample
    pub bit_error_count: u32,

    /// Probability that each trial flips a bit
    pub error_probability: f32,

    /// Keep running cycles until the process is killed
    pub repeat_forever: bool,

    /// Master seed, hex encoded in YAML (None = generate random)
    #[serde(deserialize_with = "deserialize_seed")]
    pub seed: Option<Seed>,

    /// Worker threads (None = one per logical CPU)
    pub threads: Option<usize>,

    /// Accepted for compatibility, has no effect
    pub error_correction: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            algorithm: "crc8".to_string(),
            message_length: message_length_from_bytes(5),
            total_samples: 1_000_000,
            task_count: 2000,
            bit_error_count: 1,
            error_probability: 1.0,
            repeat_forever: false,
            seed: None,
            threads: None,
            error_correction: false,
        }
    }
}

/// Convert a message size in bytes to whole 32-bit words (truncating)
pub fn message_length_from_bytes(bytes: usize) -> usize {
    bytes / WORD_BYTES
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<Option<Seed>, D::Error>
where
    D: Deserializer<'de>,
{
    let hex: Option<String> = Option::deserialize(deserializer)?;
    match hex {
        None => Ok(None),
        Some(hex) => parse_seed_hex(&hex)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid hex seed: {}", hex))),
    }
}

impl RunConfig {
    pub fn from_yaml_str(yaml: &str) -> AnalysisResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Samples each task runs (budget divided by task count, truncated)
    pub fn samples_per_task(&self) -> SampleCount {
        if self.task_count == 0 {
            0
        } else {
            self.total_samples / self.task_count as SampleCount
        }
    }

    /// Reject anything that would make the run meaningless, before any
    /// work is scheduled
    pub fn validate(&self, catalog: &AlgorithmCatalog) -> AnalysisResult<()> {
        if !catalog.contains(&self.algorithm) {
            return Err(AnalysisError::UnknownAlgorithm(self.algorithm.clone()));
        }
        if self.message_length == 0 {
            return Err(AnalysisError::invalid_config(format!(
                "message must hold at least one {}-byte word",
                WORD_BYTES
            )));
        }
        if self.total_samples == 0 {
            return Err(AnalysisError::invalid_config("sample count must be positive"));
        }
        if self.task_count == 0 {
            return Err(AnalysisError::invalid_config("task count must be positive"));
        }
        if self.samples_per_task() == 0 {
            return Err(AnalysisError::invalid_config(format!(
                "{} samples across {} tasks leaves no samples per task",
                self.total_samples, self.task_count
            )));
        }
        if !(0.0..=1.0).contains(&self.error_probability) {
            return Err(AnalysisError::invalid_config(format!(
                "error probability {} is outside [0, 1]",
                self.error_probability
            )));
        }
        if self.threads == Some(0) {
            return Err(AnalysisError::invalid_config("thread count must be positive"));
        }
        Ok(())
    }
}
