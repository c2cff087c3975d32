//! Targets and the target registry
//!
//! A target is a named, guarded group of tasks that can depend on other
//! targets. Targets are themselves tasks, so they can be nested or invoked
//! through `call`.

use crate::error::{Result, TargetError, TargetResult};
use crate::runner::guard::{self, GuardOutcome};
use crate::runner::{Context, Task, Tasks};
use std::collections::HashMap;
use tracing::{debug, debug_span};

/// A named, invokable unit of the dependency graph
#[derive(Debug)]
pub struct Target {
    name: String,

    /// Targets to run first, in order
    pub depends: Vec<String>,

    /// Properties that must all be truthy
    pub if_props: Vec<String>,

    /// Properties that must all be falsy
    pub unless_props: Vec<String>,

    /// Whether this target is excluded from listings
    pub hidden: bool,

    /// Human readable description
    pub description: Option<String>,

    /// Tasks owned by this target
    pub tasks: Tasks,
}

impl Target {
    /// Create an empty target
    pub fn new(name: impl Into<String>) -> TargetResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TargetError::EmptyName);
        }

        Ok(Target {
            name,
            depends: Vec::new(),
            if_props: Vec::new(),
            unless_props: Vec::new(),
            hidden: false,
            description: None,
            tasks: Tasks::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_depends<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_if<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.if_props.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_unless<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unless_props.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_task(mut self, task: impl Task + 'static) -> Self {
        self.tasks.push(task);
        self
    }

    /// Run dependencies, check guards, then run own tasks
    fn run(&self, ctx: &mut Context<'_>) -> Result<()> {
        let targets = ctx.targets;
        for dependency in &self.depends {
            targets.resolve_and_execute(dependency, ctx)?;
        }

        match guard::evaluate(&self.if_props, &self.unless_props, &*ctx.properties)? {
            GuardOutcome::Run => {}
            GuardOutcome::SkipIf(name) => {
                debug!(property = %name, "skipping target: 'if' property not set");
                return Ok(());
            }
            GuardOutcome::SkipUnless(name) => {
                debug!(property = %name, "skipping target: 'unless' property set");
                return Ok(());
            }
        }

        self.tasks.execute(ctx)
    }
}

impl Task for Target {
    fn kind(&self) -> &'static str {
        "target"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let _span = debug_span!("target", name = %self.name).entered();
        debug!("starting target");

        let previous = ctx.current_target.replace(self.name.clone());
        let result = self.run(ctx);
        ctx.current_target = previous;

        if result.is_ok() {
            debug!("target completed");
        }
        result
    }
}

/// Name-keyed registry of targets, kept in declaration order
#[derive(Debug, Default)]
pub struct Targets {
    targets: Vec<Target>,
    index: HashMap<String, usize>,
}

impl Targets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target; names must be unique
    pub fn add(&mut self, target: Target) -> TargetResult<()> {
        if self.index.contains_key(target.name()) {
            return Err(TargetError::Duplicate(target.name().to_string()));
        }
        self.index.insert(target.name().to_string(), self.targets.len());
        self.targets.push(target);
        Ok(())
    }

    /// Look up a target by name
    pub fn get(&self, name: &str) -> TargetResult<&Target> {
        self.index
            .get(name)
            .map(|&i| &self.targets[i])
            .ok_or_else(|| TargetError::Unknown(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate over all targets in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }

    /// Iterate over targets that should appear in listings
    pub fn visible(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| !t.hidden)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
