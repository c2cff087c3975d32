//! Build execution engine
//!
//! This module handles the execution of targets and tasks, including guard
//! evaluation and dependency resolution.

pub mod context;
pub mod executor;
pub mod guard;
pub mod project;
pub mod target;
pub mod task;

// Re-export main types
pub use context::*;
pub use executor::*;
pub use guard::GuardOutcome;
pub use project::*;
pub use target::*;
pub use task::*;
