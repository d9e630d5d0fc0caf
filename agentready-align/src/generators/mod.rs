//! Built-in fix generators.

mod ai;
mod commands;
mod templates;

use crate::generator::FixGenerator;
use std::sync::Arc;

pub use ai::AiAssistedGenerator;
pub use commands::LockFileGenerator;
pub use templates::{
    AdrGenerator, ClaudeMdGenerator, GitignoreGenerator, PreCommitGenerator, ReadmeGenerator,
    StandardLayoutGenerator,
};

pub fn builtin_generators() -> Vec<Arc<dyn FixGenerator>> {
    vec![
        Arc::new(ClaudeMdGenerator),
        Arc::new(ReadmeGenerator),
        Arc::new(LockFileGenerator),
        Arc::new(StandardLayoutGenerator),
        Arc::new(GitignoreGenerator),
        Arc::new(PreCommitGenerator),
        Arc::new(AdrGenerator),
    ]
}
