//! Project: the root of a build run
//!
//! A project owns the property store, the target registry and the top-level
//! tasks declared outside any target.

use crate::error::{PropertyResult, Result};
use crate::properties::{PropertyStore, DEFAULT_TARGET};
use crate::runner::context::default_interpreter;
use crate::runner::{Context, Targets, Tasks};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Root object of a build run
#[derive(Debug)]
pub struct Project {
    /// Project name
    pub name: Option<String>,

    /// Property store
    pub properties: PropertyStore,

    /// Target registry
    pub targets: Targets,

    /// Tasks declared outside any target
    pub tasks: Tasks,

    /// Base directory relative paths are resolved against
    pub basedir: PathBuf,

    /// Command interpreter (e.g., ["sh", "-c"])
    pub interpreter: Vec<String>,
}

impl Project {
    /// Create a project rooted at `basedir` with the built-in properties
    pub fn new(basedir: PathBuf) -> Self {
        Project {
            name: None,
            properties: PropertyStore::with_builtins(&basedir),
            targets: Targets::new(),
            tasks: Tasks::new(),
            basedir,
            interpreter: default_interpreter(),
        }
    }

    /// Name of the default target, interpolated, if one is configured
    pub fn default_target(&self) -> PropertyResult<Option<String>> {
        default_target_of(&self.properties)
    }

    /// Run the top-level tasks, then the requested targets (or the default)
    pub fn execute(&mut self, names: &[String]) -> Result<()> {
        self.execute_with_io(names, io::BufReader::new(io::stdin()), io::stdout())
    }

    /// Same as [`Project::execute`] with explicit console streams
    pub fn execute_with_io<'io>(
        &mut self,
        names: &[String],
        input: impl BufRead + 'io,
        output: impl Write + 'io,
    ) -> Result<()> {
        let Project {
            properties,
            targets,
            tasks,
            basedir,
            interpreter,
            ..
        } = self;

        let mut ctx = Context::new(properties, targets)
            .with_working_dir(basedir.clone())
            .with_interpreter(interpreter.clone())
            .with_input(input)
            .with_output(output);

        debug!(count = tasks.len(), "running top-level tasks");
        tasks.execute(&mut ctx)?;

        // top-level tasks may set or change the default
        let requested: Vec<String> = if names.is_empty() {
            default_target_of(&*ctx.properties)?.into_iter().collect()
        } else {
            names.to_vec()
        };

        if requested.is_empty() {
            debug!("no target requested and no default target set");
        }

        for name in &requested {
            info!(target_name = %name, "building target");
            ctx.target_stack.clear();
            targets.resolve_and_execute(name, &mut ctx)?;
        }

        ctx.output.flush()?;
        Ok(())
    }
}

fn default_target_of(properties: &PropertyStore) -> PropertyResult<Option<String>> {
    if !properties.has(DEFAULT_TARGET) {
        return Ok(None);
    }
    let name = properties.resolve(DEFAULT_TARGET)?;
    Ok(Some(name).filter(|name| !name.is_empty()))
}
