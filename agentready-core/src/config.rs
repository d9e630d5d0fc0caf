//! Configuration file loading for agentready.
//!
//! Discovers `agentready.toml` at the repository root. Every value is
//! validated when the file is loaded so an invalid configuration fails the
//! invocation before anything is scanned or mutated.

use agentready_align::AlignSettings;
use agentready_eval::{EvalSettings, SignificanceCriteria};
use agentready_score::{CertificationThresholds, Scorer, TierWeights};
use agentready_types::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "agentready.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentreadyConfig {
    pub scoring: ScoringConfig,
    pub scanner: ScannerConfig,
    pub align: AlignConfig,
    pub eval: EvalConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub tier_weights: TierWeightsConfig,
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TierWeightsConfig {
    pub tier1: f64,
    pub tier2: f64,
    pub tier3: f64,
    pub tier4: f64,
}

impl Default for TierWeightsConfig {
    fn default() -> Self {
        Self {
            tier1: 50.0,
            tier2: 30.0,
            tier3: 15.0,
            tier4: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdsConfig {
    pub platinum: f64,
    pub gold: f64,
    pub silver: f64,
    pub bronze: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            platinum: 90.0,
            gold: 75.0,
            silver: 60.0,
            bronze: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScannerConfig {
    /// Maximum assessors running at once.
    pub parallelism: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlignConfig {
    pub validate_each_fix: bool,
    pub branch_prefix: String,
    pub commit_message: String,
    pub allow_ai_assisted: bool,
}

impl Default for AlignConfig {
    fn default() -> Self {
        let defaults = AlignSettings::default();
        Self {
            validate_each_fix: defaults.validate_each_fix,
            branch_prefix: defaults.branch_prefix,
            commit_message: defaults.commit_message,
            allow_ai_assisted: defaults.allow_ai_assisted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub iterations: u32,
    pub timeout_secs: u64,
    pub parallelism: usize,
    pub min_samples: usize,
    pub p_threshold: f64,
    pub effect_threshold: f64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        let settings = EvalSettings::default();
        Self {
            iterations: settings.iterations,
            timeout_secs: settings.timeout.as_secs(),
            parallelism: settings.parallelism,
            min_samples: settings.criteria.min_samples,
            p_threshold: settings.criteria.p_threshold,
            effect_threshold: settings.criteria.effect_threshold,
        }
    }
}

impl AgentreadyConfig {
    /// Checks every section; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scorer()?;
        if self.scanner.parallelism == 0 {
            return Err(ConfigError::InvalidValue {
                key: "scanner.parallelism".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.align.branch_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "align.branch_prefix".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.align.commit_message.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "align.commit_message".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        self.eval_settings().validate()
    }

    pub fn scorer(&self) -> Result<Scorer, ConfigError> {
        let w = &self.scoring.tier_weights;
        let t = &self.scoring.thresholds;
        Ok(Scorer::new(
            TierWeights::new(w.tier1, w.tier2, w.tier3, w.tier4)?,
            CertificationThresholds::new(t.platinum, t.gold, t.silver, t.bronze)?,
        ))
    }

    /// Align defaults from the `[align]` section; mode and subset are left to
    /// the caller.
    pub fn align_settings(&self) -> AlignSettings {
        AlignSettings {
            validate_each_fix: self.align.validate_each_fix,
            allow_ai_assisted: self.align.allow_ai_assisted,
            branch_prefix: self.align.branch_prefix.clone(),
            commit_message: self.align.commit_message.clone(),
            ..AlignSettings::default()
        }
    }

    pub fn eval_settings(&self) -> EvalSettings {
        EvalSettings {
            iterations: self.eval.iterations,
            timeout: Duration::from_secs(self.eval.timeout_secs),
            parallelism: self.eval.parallelism,
            criteria: SignificanceCriteria {
                p_threshold: self.eval.p_threshold,
                effect_threshold: self.eval.effect_threshold,
                min_samples: self.eval.min_samples,
            },
        }
    }
}

/// Returns the config path when `agentready.toml` exists at `repo_root`.
pub fn discover_config(repo_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let path = repo_root.join(CONFIG_FILE_NAME);
    if path.is_file() {
        debug!(path = %path, "found config file");
        Some(path)
    } else {
        debug!(path = %path, "no config file");
        None
    }
}

pub fn load_config(path: &Utf8Path) -> Result<AgentreadyConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Parse {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    parse_named(&contents, path.as_str())
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<AgentreadyConfig, ConfigError> {
    parse_named(contents, CONFIG_FILE_NAME)
}

fn parse_named(contents: &str, origin: &str) -> Result<AgentreadyConfig, ConfigError> {
    let config: AgentreadyConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.message().to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads `agentready.toml` from `repo_root`, or the defaults when absent.
pub fn load_or_default(repo_root: &Utf8Path) -> Result<AgentreadyConfig, ConfigError> {
    match discover_config(repo_root) {
        Some(path) => load_config(&path),
        None => Ok(AgentreadyConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parses_a_full_config() {
        let config = parse_config(
            r#"
[scoring.tier_weights]
tier1 = 40.0
tier2 = 30.0
tier3 = 20.0
tier4 = 10.0

[scoring.thresholds]
platinum = 95.0
gold = 80.0
silver = 65.0
bronze = 45.0

[scanner]
parallelism = 8

[align]
branch_prefix = "bot/agentready-"
allow_ai_assisted = true

[eval]
iterations = 10
timeout_secs = 120
p_threshold = 0.01
"#,
        )
        .expect("valid config");

        assert_eq!(config.scanner.parallelism, 8);
        assert_eq!(config.scoring.tier_weights.tier4, 10.0);
        assert_eq!(config.align.branch_prefix, "bot/agentready-");
        assert!(config.align.allow_ai_assisted);
        assert!(config.align.validate_each_fix);

        let eval = config.eval_settings();
        assert_eq!(eval.iterations, 10);
        assert_eq!(eval.timeout, Duration::from_secs(120));
        assert_eq!(eval.criteria.p_threshold, 0.01);
        assert_eq!(eval.criteria.effect_threshold, 0.2);
    }

    #[test]
    fn empty_config_is_the_default() {
        assert_eq!(parse_config("").expect("empty"), AgentreadyConfig::default());
        assert!(AgentreadyConfig::default().validate().is_ok());
    }

    #[test]
    fn weights_must_sum_to_one_hundred() {
        let err = parse_config("[scoring.tier_weights]\ntier1 = 60.0\n").expect_err("sum 110");
        assert!(matches!(err, ConfigError::WeightSum { .. }));
    }

    #[test]
    fn thresholds_must_descend() {
        let err = parse_config("[scoring.thresholds]\ngold = 95.0\n").expect_err("gold above platinum");
        assert!(matches!(err, ConfigError::Thresholds { .. }));
    }

    #[test]
    fn zero_parallelism_and_iterations_are_rejected() {
        let err = parse_config("[scanner]\nparallelism = 0\n").expect_err("zero");
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "scanner.parallelism".to_string(),
                message: "must be at least 1".to_string(),
            }
        );
        assert!(parse_config("[eval]\niterations = 0\n").is_err());
        assert!(parse_config("[eval]\np_threshold = 0.0\n").is_err());
    }

    #[test]
    fn malformed_or_unknown_keys_are_parse_errors() {
        assert!(matches!(
            parse_config("[scanner\n"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            parse_config("[scanner]\nthreads = 3\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_or_default_discovers_the_file() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert_eq!(load_or_default(&root).expect("default"), AgentreadyConfig::default());

        fs::write(root.join(CONFIG_FILE_NAME), "[eval]\niterations = 3\n").expect("write");
        assert_eq!(discover_config(&root), Some(root.join(CONFIG_FILE_NAME)));
        assert_eq!(load_or_default(&root).expect("load").eval.iterations, 3);
    }
}
