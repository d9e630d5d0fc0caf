//! Embeddable core library for agentready.
//!
//! Provides clap-free entry points suitable for linking into a CLI or any
//! other host process.
//!
//! # Port traits
//!
//! Side effects sit behind the traits in [`ports`]:
//! - [`VcsPort`](ports::VcsPort) and [`ReviewPort`](ports::ReviewPort) for
//!   review-request mode
//! - [`CommandRunner`](ports::CommandRunner) for command fixes
//! - [`BenchmarkRunner`](ports::BenchmarkRunner) for evaluation
//! - [`WritePort`](ports::WritePort) for artifacts
//!
//! [`adapters`] holds the process- and filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_assess`](pipeline::run_assess)
//! - [`run_align`](pipeline::run_align)
//! - [`run_eval`](pipeline::run_eval)

pub mod adapters;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod telemetry;

pub use error::ToolError;
pub use telemetry::init_tracing;
