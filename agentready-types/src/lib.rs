//! Shared DTOs (schemas-as-code) for the agentready workspace.
//!
//! # Design constraints
//! - These types are intended to be serialized to disk and handed to
//!   external reporting collaborators.
//! - Everything here is plain data plus the invariants the constructors
//!   enforce; behavior lives in the engine crates.
//! - Prefer adding optional fields over changing semantics.

pub mod align;
pub mod assessment;
pub mod attribute;
pub mod cancel;
pub mod error;
pub mod eval;
pub mod finding;
pub mod fix;
pub mod repository;

pub use attribute::{Attribute, Tier};
pub use cancel::CancelFlag;
pub use error::ConfigError;
pub use finding::{Completion, Finding, FindingStatus, Remediation};
pub use repository::{GitMetadata, Repository};

/// Schema identifiers.
pub mod schema {
    pub const AGENTREADY_ASSESSMENT_V1: &str = "agentready.assessment.v1";
    pub const AGENTREADY_ALIGN_V1: &str = "agentready.align.v1";
    pub const AGENTREADY_EVAL_V1: &str = "agentready.eval.v1";
}
