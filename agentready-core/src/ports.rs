//! Port traits abstracting the pipelines' side effects.
//!
//! Version control and review-request ports are owned by the align engine
//! and re-exported here so embedders need a single dependency.

use camino::Utf8Path;

pub use agentready_align::{CommandRunner, Confirmer, ReviewPort, VcsPort};
pub use agentready_eval::BenchmarkRunner;

/// File-system write operations for artifacts.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
