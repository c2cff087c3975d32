//! Task abstraction and ordered task sequences
//!
//! Every build step implements [`Task`]. Tasks receive the execution context
//! explicitly and report failures through the crate error type.

use crate::error::Result;
use crate::runner::Context;
use std::fmt;
use tracing::{debug, error};

/// One unit of build work
pub trait Task: fmt::Debug {
    /// Task type, used in diagnostics (e.g. "copy")
    fn kind(&self) -> &'static str;

    /// Execute the task in the given context
    fn execute(&self, ctx: &mut Context<'_>) -> Result<()>;
}

/// Append-only, insertion-ordered sequence of tasks
#[derive(Debug, Default)]
pub struct Tasks {
    items: Vec<Box<dyn Task>>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task
    pub fn push(&mut self, task: impl Task + 'static) {
        self.items.push(Box::new(task));
    }

    /// Append an already boxed task
    pub fn push_boxed(&mut self, task: Box<dyn Task>) {
        self.items.push(task);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over tasks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Task> {
        self.items.iter().map(|t| t.as_ref())
    }

    /// Execute every task in order, stopping at the first failure
    pub fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        for task in &self.items {
            debug!(task = task.kind(), target_name = ctx.target_label(), "executing task");
            if let Err(e) = task.execute(ctx) {
                error!(task = task.kind(), target_name = ctx.target_label(), error = %e, "task failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

impl From<Vec<Box<dyn Task>>> for Tasks {
    fn from(items: Vec<Box<dyn Task>>) -> Self {
        Tasks { items }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::properties::PropertyStore;
    use crate::runner::Targets;

    #[test]
    fn test_tasks_run_in_insertion_order() {
        let journal = journal();
        let mut tasks = Tasks::new();
        tasks.push(Record::ok("one", &journal));
        tasks.push(Record::ok("two", &journal));
        tasks.push(Record::ok("three", &journal));

        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let mut ctx = Context::new(&mut props, &targets);

        tasks.execute(&mut ctx).unwrap();
        assert_eq!(entries(&journal), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_tasks_fail_fast() {
        let journal = journal();
        let mut tasks = Tasks::new();
        tasks.push(Record::ok("first", &journal));
        tasks.push(Record::failing("second", &journal));
        tasks.push(Record::ok("third", &journal));

        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let mut ctx = Context::new(&mut props, &targets);

        let err = tasks.execute(&mut ctx).unwrap_err();
        assert!(is_failure_of(&err, "second"));
        assert_eq!(entries(&journal), vec!["first", "second"]);
    }

    #[test]
    fn test_empty_tasks() {
        let tasks = Tasks::new();
        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let mut ctx = Context::new(&mut props, &targets);

        assert!(tasks.is_empty());
        assert!(tasks.execute(&mut ctx).is_ok());
    }
}
