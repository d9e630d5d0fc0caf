//! Clap-free settings for the assess, align and eval pipelines.

use agentready_eval::Selection;
use agentready_types::align::AlignMode;
use camino::Utf8PathBuf;
use std::collections::BTreeSet;

/// Settings for the assess pipeline.
#[derive(Debug, Clone)]
pub struct AssessSettings {
    pub repo_root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,

    /// Explicit config file; otherwise `agentready.toml` at the repo root.
    pub config_path: Option<Utf8PathBuf>,

    /// Restrict the scan to these attribute ids.
    pub attributes: Vec<String>,
}

impl Default for AssessSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/agentready"),
            config_path: None,
            attributes: Vec::new(),
        }
    }
}

/// Settings for the align pipeline. Everything not listed here comes from
/// the `[align]` config section.
#[derive(Debug, Clone)]
pub struct AlignRunSettings {
    pub repo_root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub config_path: Option<Utf8PathBuf>,
    pub mode: AlignMode,
    pub attributes: Option<BTreeSet<String>>,
    pub interactive: bool,
}

impl Default for AlignRunSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/agentready"),
            config_path: None,
            mode: AlignMode::Preview,
            attributes: None,
            interactive: false,
        }
    }
}

/// Settings for the eval pipeline.
#[derive(Debug, Clone)]
pub struct EvalRunSettings {
    pub repo_root: Utf8PathBuf,
    pub out_dir: Utf8PathBuf,
    pub config_path: Option<Utf8PathBuf>,
    pub selection: Selection,

    /// Persist the impact ledger here as results arrive.
    pub ledger_dir: Option<Utf8PathBuf>,
}

impl Default for EvalRunSettings {
    fn default() -> Self {
        Self {
            repo_root: Utf8PathBuf::from("."),
            out_dir: Utf8PathBuf::from("artifacts/agentready"),
            config_path: None,
            selection: Selection::All,
            ledger_dir: None,
        }
    }
}
