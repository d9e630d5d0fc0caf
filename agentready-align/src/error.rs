use agentready_assess::ScanError;
use agentready_types::ConfigError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Failure applying (or simulating) one fix. Always recoverable at the
/// engine level: the fix is rolled back and the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("{path} already exists")]
    AlreadyExists { path: Utf8PathBuf },

    #[error("{path} does not exist")]
    Missing { path: Utf8PathBuf },

    #[error("text `{find}` not found in {path}")]
    PatternNotFound { path: Utf8PathBuf, find: String },

    #[error("path {path} is not a relative path inside the repository")]
    PathEscape { path: Utf8PathBuf },

    #[error("command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("i/o error on {path}: {message}")]
    Io { path: Utf8PathBuf, message: String },
}

/// Failures that abort an align invocation.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("repository {path} is unavailable: {message}")]
    RepositoryUnavailable { path: Utf8PathBuf, message: String },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("version control operation failed: {0:#}")]
    Vcs(anyhow::Error),

    #[error("review request failed: {0:#}")]
    Review(anyhow::Error),
}
