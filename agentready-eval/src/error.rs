use agentready_align::AlignError;
use agentready_assess::{DiscoveryError, ScanError};
use agentready_types::ConfigError;
use thiserror::Error;

/// Failure of one benchmark invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BenchmarkError {
    /// The benchmark cannot run at all; aborts the enclosing operation.
    #[error("benchmark unavailable: {0}")]
    Unavailable(String),

    /// This invocation produced no score; recorded as a dropped sample.
    #[error("benchmark run failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("benchmark unavailable: {0}")]
    BenchmarkUnavailable(String),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error("isolated workspace: {0:#}")]
    Workspace(anyhow::Error),

    #[error("impact ledger: {0:#}")]
    Ledger(anyhow::Error),

    #[error("trial task failed: {0}")]
    Task(String),
}
