use agentready_align::AlignError;
use agentready_assess::{DiscoveryError, ScanError};
use agentready_eval::EvalError;
use agentready_types::ConfigError;

/// Pipeline failure taxonomy. Exit code 2 = configuration, 1 = everything
/// else.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    RepositoryUnavailable(String),

    #[error("benchmark unavailable: {0}")]
    BenchmarkUnavailable(String),

    #[error("{0}")]
    FixApplicationFailure(String),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn label(&self) -> &'static str {
        match self {
            ToolError::Config(_) => "ConfigurationError",
            ToolError::RepositoryUnavailable(_) => "RepositoryUnavailable",
            ToolError::BenchmarkUnavailable(_) => "BenchmarkUnavailable",
            ToolError::FixApplicationFailure(_) => "FixApplicationFailure",
            ToolError::Internal(_) => "Internal",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Config(_) => 2,
            _ => 1,
        }
    }
}

impl From<DiscoveryError> for ToolError {
    fn from(e: DiscoveryError) -> Self {
        match e {
            DiscoveryError::Unavailable { .. } => ToolError::RepositoryUnavailable(e.to_string()),
            DiscoveryError::Walk { .. } => ToolError::Internal(e.into()),
        }
    }
}

impl From<ScanError> for ToolError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::ZeroParallelism => ToolError::Config(ConfigError::InvalidValue {
                key: "scanner.parallelism".to_string(),
                message: e.to_string(),
            }),
            ScanError::Pool(_) => ToolError::Internal(e.into()),
        }
    }
}

impl From<AlignError> for ToolError {
    fn from(e: AlignError) -> Self {
        match e {
            AlignError::Config(c) => ToolError::Config(c),
            AlignError::RepositoryUnavailable { .. } => ToolError::RepositoryUnavailable(e.to_string()),
            AlignError::Scan(s) => s.into(),
            AlignError::Vcs(_) | AlignError::Review(_) => ToolError::FixApplicationFailure(e.to_string()),
        }
    }
}

impl From<EvalError> for ToolError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::Config(c) => ToolError::Config(c),
            EvalError::BenchmarkUnavailable(message) => ToolError::BenchmarkUnavailable(message),
            EvalError::Discovery(d) => d.into(),
            EvalError::Scan(s) => s.into(),
            EvalError::Align(a) => a.into(),
            other @ (EvalError::Workspace(_) | EvalError::Ledger(_) | EvalError::Task(_)) => {
                ToolError::Internal(anyhow::Error::new(other))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn labels_and_exit_codes() {
        let config: ToolError = ConfigError::UnknownAttribute { id: "x".to_string() }.into();
        assert_eq!(config.label(), "ConfigurationError");
        assert_eq!(config.exit_code(), 2);

        let missing: ToolError = DiscoveryError::Unavailable {
            path: Utf8PathBuf::from("/nowhere"),
            message: "not found".to_string(),
        }
        .into();
        assert_eq!(missing.label(), "RepositoryUnavailable");
        assert_eq!(missing.exit_code(), 1);

        let bench: ToolError = EvalError::BenchmarkUnavailable("gone".to_string()).into();
        assert_eq!(bench.label(), "BenchmarkUnavailable");

        let vcs: ToolError = AlignError::Vcs(anyhow::anyhow!("detached")).into();
        assert_eq!(vcs.label(), "FixApplicationFailure");

        let nested: ToolError = EvalError::Align(AlignError::Config(ConfigError::UnknownAttribute {
            id: "y".to_string(),
        }))
        .into();
        assert_eq!(nested.exit_code(), 2);
    }
}
