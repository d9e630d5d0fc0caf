//! Before/after impact evaluation of remediations.
//!
//! [`EvalHarness`] measures a benchmark on the unmodified repository, then for
//! each selected attribute remediates a private clone with the align engine
//! and measures again. Each comparison is judged by a pooled Student t-test
//! and Cohen's d; an impact is significant only when both `p` and `|d|` clear
//! their thresholds.

pub mod aggregate;
pub mod error;
pub mod harness;
pub mod ledger;
pub mod runner;
pub mod sampling;
pub mod stats;
pub mod workspace;

pub use aggregate::summarize;
pub use error::{BenchmarkError, EvalError};
pub use harness::{EvalHarness, EvalSettings, Selection};
pub use ledger::ImpactLedger;
pub use runner::{BenchmarkRunner, MockBenchmarkRunner, ShellBenchmarkRunner};
pub use sampling::{Samples, collect_samples};
pub use stats::{Comparison, SignificanceCriteria, compare};
pub use workspace::IsolatedWorkspace;
