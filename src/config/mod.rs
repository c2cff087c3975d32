//! Build file loading and validation
//!
//! This module handles discovery and parsing of brisk.yml build files and
//! turns them into a validated [`Project`](crate::runner::Project).

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::{BuildFile, TargetDef, TaskDef};
