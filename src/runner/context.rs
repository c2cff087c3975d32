//! Execution context for build runs
//!
//! The context ties together everything a task needs while it executes: the
//! property store, the target registry, the working directory and the console
//! streams.

use crate::error::{Result, TaskError, TOP_LEVEL};
use crate::properties::PropertyStore;
use crate::runner::Targets;
use crate::tasks::Fileset;
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Execution context that tracks state during a build run
pub struct Context<'a> {
    /// Property store of the running project
    pub properties: &'a mut PropertyStore,

    /// Target registry of the running project
    pub targets: &'a Targets,

    /// Directory relative paths are resolved against
    pub working_dir: PathBuf,

    /// Command interpreter (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,

    /// Filesets registered by id
    pub filesets: HashMap<String, Fileset>,

    /// Name of the target whose tasks are running
    pub current_target: Option<String>,

    /// Stack of targets being executed (for detecting cycles)
    pub target_stack: Vec<String>,

    /// Stream prompts read from
    pub input: Box<dyn BufRead + 'a>,

    /// Stream messages and command output are written to
    pub output: Box<dyn Write + 'a>,
}

impl<'a> Context<'a> {
    /// Create a context attached to the process console
    pub fn new(properties: &'a mut PropertyStore, targets: &'a Targets) -> Self {
        Context {
            properties,
            targets,
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            interpreter: default_interpreter(),
            filesets: HashMap::new(),
            current_target: None,
            target_stack: Vec::new(),
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Read prompts from a different stream
    pub fn with_input(mut self, input: impl BufRead + 'a) -> Self {
        self.input = Box::new(input);
        self
    }

    /// Write messages to a different stream
    pub fn with_output(mut self, output: impl Write + 'a) -> Self {
        self.output = Box::new(output);
        self
    }

    /// Resolve every property reference in `s`
    pub fn filter(&self, s: &str) -> Result<String> {
        Ok(self.properties.filter(s)?)
    }

    /// Filter an optional field, passing `None` through
    pub fn filter_opt(&self, s: Option<&String>) -> Result<Option<String>> {
        s.map(|s| self.filter(s)).transpose()
    }

    /// Filter a required field, failing when it is not configured
    pub fn require(
        &self,
        task: &'static str,
        field: &'static str,
        value: Option<&String>,
    ) -> Result<String> {
        match value {
            Some(v) => self.filter(v),
            None => Err(self.missing(task, field).into()),
        }
    }

    /// Build a missing-configuration error for the current target
    pub fn missing(&self, task: &'static str, field: &'static str) -> TaskError {
        TaskError::MissingConfiguration {
            task,
            field,
            target: self.target_label().to_string(),
        }
    }

    /// Build an invalid-configuration error for the current target
    pub fn invalid(&self, task: &'static str, message: impl Into<String>) -> TaskError {
        TaskError::InvalidConfiguration {
            task,
            target: self.target_label().to_string(),
            message: message.into(),
        }
    }

    /// Name of the running target, or a marker for top-level tasks
    pub fn target_label(&self) -> &str {
        self.current_target.as_deref().unwrap_or(TOP_LEVEL)
    }

    /// Resolve a (filtered) path against the working directory
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.working_dir.join(path)
    }

    /// Push a target onto the execution stack
    pub fn push_target(&mut self, name: String) {
        self.target_stack.push(name);
    }

    /// Pop a target from the execution stack
    pub fn pop_target(&mut self) -> Option<String> {
        self.target_stack.pop()
    }

    /// Check if a target is in the execution stack (detect cycles)
    pub fn is_target_in_stack(&self, name: &str) -> bool {
        self.target_stack.iter().any(|t| t == name)
    }
}

/// Interpreter used when the build file does not name one
pub fn default_interpreter() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}
