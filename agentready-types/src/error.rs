use thiserror::Error;

/// Invalid configuration. Always fails the whole invocation before any
/// mutation happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("tier weights must sum to 100, got {sum}")]
    WeightSum { sum: f64 },

    #[error("tier {tier} weight must be a finite non-negative number, got {weight}")]
    InvalidWeight { tier: u8, weight: f64 },

    #[error("malformed certification thresholds: {message}")]
    Thresholds { message: String },

    #[error("unknown attribute id `{id}`")]
    UnknownAttribute { id: String },

    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },

    #[error("config file {path}: {message}")]
    Parse { path: String, message: String },
}
