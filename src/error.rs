//! Error types for Brisk

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Brisk operations
pub type Result<T> = std::result::Result<T, BriskError>;

/// Main error type for Brisk
#[derive(Error, Debug)]
pub enum BriskError {
    /// Build file loading and validation errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Property interpolation errors
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// Target registry and dependency resolution errors
    #[error("Target error: {0}")]
    Target(#[from] TargetError),

    /// Task execution errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Build file parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find build file (searched: {0})")]
    NotFound(String),

    #[error("Invalid build file: {0}")]
    Invalid(String),

    #[error("Unknown task type '{0}'")]
    UnknownTask(String),

    #[error("Target '{target}' depends on undefined target '{dependency}'")]
    UndefinedDependency { target: String, dependency: String },

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Failed to read build file '{path}': {error}")]
    Read { path: PathBuf, error: String },
}

/// Property interpolation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Property '{name}' references itself ({chain})")]
    Cycle { name: String, chain: String },

    #[error("Property '{0}' is not defined")]
    Unknown(String),

    #[error("Property resolution exceeded {0} nested substitutions")]
    TooDeep(usize),
}

/// Target registry and executor errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("Circular target dependency: {0}")]
    Cycle(String),

    #[error("Target '{0}' is already defined")]
    Duplicate(String),

    #[error("Target '{0}' does not exist")]
    Unknown(String),

    #[error("Target name must not be empty")]
    EmptyName,

    #[error("Target nesting exceeded {0} levels")]
    TooDeep(usize),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("[{target}] {task}: required attribute '{field}' is not set")]
    MissingConfiguration {
        task: &'static str,
        field: &'static str,
        target: String,
    },

    #[error("[{target}] {task}: {message}")]
    InvalidConfiguration {
        task: &'static str,
        target: String,
        message: String,
    },

    #[error("{task}: failed to {action} '{}': {source}", path.display())]
    Io {
        task: &'static str,
        action: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Command '{command}' failed with exit code {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Invalid input '{value}', expected one of: {valid}")]
    InvalidInput { value: String, valid: String },
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for property operations
pub type PropertyResult<T> = std::result::Result<T, PropertyError>;

/// Specialized result type for target registry operations
pub type TargetResult<T> = std::result::Result<T, TargetError>;

/// Specialized result type for task operations
pub type TaskResult<T> = std::result::Result<T, TaskError>;

/// Label used in diagnostics for tasks declared outside any target
pub const TOP_LEVEL: &str = "top level";
