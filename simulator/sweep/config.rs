//! Sweep file format

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use crc_analysis::RunConfig;

/// A sweep file: metadata, the base configuration, and the bit-error counts
/// to run it with
#[derive(Debug, serde::Deserialize)]
pub struct SweepFile {
    #[serde(default)]
    pub meta: SweepMeta,

    #[serde(default)]
    pub config: RunConfig,

    /// Bit-error counts to sweep (None = run the config as is)
    #[serde(default)]
    pub bit_errors: Option<Vec<u32>>,
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct SweepMeta {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl SweepFile {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let sweep: SweepFile = serde_yaml::from_str(yaml).context("invalid sweep file")?;
        sweep.check()?;
        Ok(sweep)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&yaml).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn check(&self) -> Result<()> {
        if self.config.repeat_forever {
            bail!("repeat_forever cannot be used in a sweep");
        }
        if let Some(ref counts) = self.bit_errors {
            if counts.is_empty() {
                bail!("bit_errors must list at least one count");
            }
        }
        Ok(())
    }

    /// Configurations to run, one per sweep point
    pub fn points(&self) -> Vec<RunConfig> {
        match self.bit_errors {
            Some(ref counts) => counts
                .iter()
                .map(|&bit_errors| RunConfig {
                    bit_error_count: bit_errors,
                    ..self.config.clone()
                })
                .collect(),
            None => vec![self.config.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sweep() {
        let yaml = r#"
meta:
  name: crc16 weights
config:
  algorithm: crc16_arc
  total_samples: 1000
  task_count: 10
bit_errors: [1, 2, 3]
"#;
        let sweep = SweepFile::from_yaml_str(yaml).unwrap();
        assert_eq!(sweep.meta.name.as_deref(), Some("crc16 weights"));

        let points = sweep.points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].bit_error_count, 3);
        assert_eq!(points[2].algorithm, "crc16_arc");
        assert_eq!(points[2].total_samples, 1000);
    }

    #[test]
    fn test_single_point_without_list() {
        let sweep = SweepFile::from_yaml_str("config:\n  algorithm: xor16\n").unwrap();
        let points = sweep.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].algorithm, "xor16");
    }

    #[test]
    fn test_rejects_forever_and_empty_list() {
        assert!(SweepFile::from_yaml_str("config:\n  repeat_forever: true\n").is_err());
        assert!(SweepFile::from_yaml_str("bit_errors: []\n").is_err());
    }
}
