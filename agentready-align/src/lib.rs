//! Remediation (align) engine.
//!
//! - [`Planner`]: maps `fail`/`partial` findings to exactly one [`Fix`] each,
//!   using the first accepting [`FixGenerator`].
//! - [`edit`]: side-effect-free simulation for previews, plus the real apply.
//! - [`Snapshot`]: per-fix reversible snapshot of every touched path.
//! - [`AlignEngine`]: the Planning → Previewing → Confirming → Applying →
//!   Verifying → Committed | RolledBack state machine.
//!
//! [`Fix`]: agentready_types::fix::Fix

pub mod edit;
pub mod engine;
pub mod error;
pub mod generator;
pub mod generators;
pub mod planner;
pub mod ports;
pub mod runner;
pub mod snapshot;
pub mod validate;

pub use engine::{AlignEngine, AlignSettings};
pub use error::{AlignError, ApplyError};
pub use generator::{FixGenerator, GeneratorCatalog, SuggestionProvider};
pub use planner::{Plan, Planner};
pub use ports::{AcceptAll, Confirmer, FixPreview, ReviewPort, VcsPort};
pub use runner::{CommandRunner, ShellCommandRunner};
pub use snapshot::Snapshot;
pub use validate::{FixValidator, ReassessValidator, Validation};
