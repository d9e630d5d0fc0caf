//! Assessor registry and scanner.
//!
//! Each attribute check implements [`Assessor`]. The built-in checks are
//! enumerated explicitly in [`catalog::builtin_assessors`] and wrapped in a
//! constructed [`Registry`] value that callers pass to the [`Scanner`].

pub mod assessor;
pub mod catalog;
pub mod discovery;
pub mod keywords;
pub mod registry;
pub mod scanner;

pub use assessor::{Assessor, Probe};
pub use discovery::{DiscoveryError, discover_repository};
pub use registry::{CATALOG_VERSION, Registry};
pub use scanner::{ScanError, Scanner};
