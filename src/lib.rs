//! Brisk - a declarative, target-based build tool
//!
//! A build file declares properties, targets and tasks. Targets depend on
//! other targets, are guarded by `if`/`unless` properties and run their tasks
//! in order; `${name}` references are interpolated when a task runs.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod properties;
pub mod runner;
pub mod tasks;

// Re-export commonly used types
pub use error::{BriskError, Result};

/// Current version of Brisk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
