//! Error types shared by the analysis engine.

use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unknown checksum algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AnalysisError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidConfig(msg.into())
    }
}
