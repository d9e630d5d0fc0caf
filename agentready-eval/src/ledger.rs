//! Append-only store of baseline and impact results for one harness session.
//!
//! Writes go through a single writer (the harness task); readers may query
//! concurrently. When backed by a directory every record is persisted as
//! soon as it is appended:
//!
//! ```text
//! <dir>/baseline/summary.json
//! <dir>/assessors/<attribute_id>/impact.json
//! <dir>/summary.json
//! ```

use agentready_types::eval::{BaselineRun, EvalSummary, ImpactResult};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Serialize;
use std::io::ErrorKind;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct LedgerState {
    baseline: Option<BaselineRun>,
    impacts: Vec<ImpactResult>,
}

#[derive(Debug, Default)]
pub struct ImpactLedger {
    state: RwLock<LedgerState>,
    dir: Option<Utf8PathBuf>,
}

impl ImpactLedger {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn persistent(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            state: RwLock::default(),
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Utf8Path> {
        self.dir.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_baseline(&self, baseline: BaselineRun) -> anyhow::Result<()> {
        if let Some(dir) = &self.dir {
            write_json(&dir.join("baseline").join("summary.json"), &baseline)?;
        }
        self.write().baseline = Some(baseline);
        Ok(())
    }

    /// Appends a result; earlier results are never replaced.
    pub fn record_impact(&self, impact: ImpactResult) -> anyhow::Result<()> {
        if let Some(dir) = &self.dir {
            let path = dir
                .join("assessors")
                .join(&impact.attribute_id)
                .join("impact.json");
            write_json(&path, &impact)?;
        }
        self.write().impacts.push(impact);
        Ok(())
    }

    pub fn write_summary(&self, summary: &EvalSummary) -> anyhow::Result<()> {
        match &self.dir {
            Some(dir) => write_json(&dir.join("summary.json"), summary),
            None => Ok(()),
        }
    }

    pub fn baseline(&self) -> Option<BaselineRun> {
        self.read().baseline.clone()
    }

    pub fn impacts(&self) -> Vec<ImpactResult> {
        self.read().impacts.clone()
    }

    pub fn len(&self) -> usize {
        self.read().impacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().impacts.is_empty()
    }

    /// Re-opens a persisted ledger. Unreadable or malformed impact files are
    /// logged and skipped; a missing directory yields an empty ledger.
    pub fn load(dir: impl Into<Utf8PathBuf>) -> anyhow::Result<Self> {
        let ledger = Self::persistent(dir);
        let Some(dir) = ledger.dir.clone() else {
            return Ok(ledger);
        };

        let baseline_path = dir.join("baseline").join("summary.json");
        if let Some(baseline) = read_optional_json::<BaselineRun>(&baseline_path)? {
            ledger.write().baseline = Some(baseline);
        }

        let assessors = dir.join("assessors");
        let listing = match fs::read_dir(&assessors) {
            Ok(listing) => listing,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ledger),
            Err(e) => return Err(e).with_context(|| format!("list {assessors}")),
        };
        let mut entries: Vec<_> = listing
            .filter_map(Result::ok)
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        entries.sort();

        let mut impacts = Vec::new();
        for name in entries {
            let path = assessors.join(&name).join("impact.json");
            match read_optional_json::<ImpactResult>(&path) {
                Ok(Some(impact)) => impacts.push(impact),
                Ok(None) => {}
                Err(e) => warn!(path = %path, error = %format!("{e:#}"), "skipping unreadable impact"),
            }
        }
        debug!(dir = %dir, impacts = impacts.len(), "loaded impact ledger");
        ledger.write().impacts = impacts;
        Ok(ledger)
    }
}

fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    let mut bytes = serde_json::to_vec_pretty(value).context("serialize ledger record")?;
    bytes.push(b'\n');
    fs::write(path, bytes).with_context(|| format!("write {path}"))
}

/// `Ok(None)` when the file does not exist.
fn read_optional_json<T: serde::de::DeserializeOwned>(path: &Utf8Path) -> anyhow::Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {path}")),
    };
    serde_json::from_str(&contents)
        .map(Some)
        .with_context(|| format!("parse {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentready_types::Tier;
    use agentready_types::eval::Significance;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn baseline() -> BaselineRun {
        BaselineRun {
            samples: vec![60.0, 62.0],
            mean: 61.0,
            std_dev: 1.414,
            n: 2,
            dropped: vec![],
            fingerprint: "f".to_string(),
            recorded_at: Utc::now(),
        }
    }

    fn impact(id: &str, delta: f64) -> ImpactResult {
        ImpactResult {
            attribute_id: id.to_string(),
            attribute_name: id.to_string(),
            tier: Tier::Essential,
            baseline_mean: 61.0,
            post_mean: 61.0 + delta,
            delta,
            t_statistic: None,
            p_value: None,
            cohens_d: None,
            effect: None,
            significance: Significance::InsufficientData {
                reason: "test".to_string(),
            },
            iterations: 2,
            samples: vec![],
            dropped_samples: vec![],
            fixes_applied: 0,
            remediation_log: vec![],
        }
    }

    #[test]
    fn persisted_records_reload_and_bad_entries_are_skipped() {
        let temp = TempDir::new().expect("temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");

        let ledger = ImpactLedger::persistent(dir.clone());
        ledger.record_baseline(baseline()).expect("baseline");
        ledger.record_impact(impact("readme_structure", 1.5)).expect("impact");
        ledger.record_impact(impact("claude_md_file", 3.0)).expect("impact");
        assert!(dir.join("baseline/summary.json").is_file());
        assert!(dir.join("assessors/claude_md_file/impact.json").is_file());

        fs::create_dir_all(dir.join("assessors/broken")).expect("mkdir");
        fs::write(dir.join("assessors/broken/impact.json"), "{not json").expect("write");

        let loaded = ImpactLedger::load(dir).expect("load");
        assert_eq!(loaded.baseline().map(|b| b.samples), Some(vec![60.0, 62.0]));
        let ids: Vec<String> = loaded.impacts().into_iter().map(|i| i.attribute_id).collect();
        assert_eq!(ids, vec!["claude_md_file", "readme_structure"]);
    }

    #[test]
    fn missing_files_load_as_an_empty_ledger() {
        let temp = TempDir::new().expect("temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().join("never-written")).expect("utf8");

        let loaded = ImpactLedger::load(dir.clone()).expect("load");
        assert!(loaded.baseline().is_none());
        assert!(loaded.is_empty());
        assert_eq!(loaded.dir(), Some(dir.as_path()));

        fs::create_dir_all(dir.join("assessors/pending")).expect("mkdir");
        let loaded = ImpactLedger::load(dir).expect("load");
        assert!(loaded.is_empty());
    }

    #[test]
    fn in_memory_ledger_writes_nothing() {
        let ledger = ImpactLedger::in_memory();
        ledger.record_impact(impact("a", 0.0)).expect("impact");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.dir(), None);
        ledger.write_summary(&EvalSummary {
            schema: String::new(),
            timestamp: Utc::now(),
            baseline: baseline(),
            impacts: vec![],
            tier_averages: vec![],
            total_tested: 0,
            significant_improvements: 0,
        })
        .expect("noop");
    }
}
