//! Invoke another target from within a task list

use crate::config::types::scalar_pairs;
use crate::error::Result;
use crate::runner::{Context, Task};
use serde::Deserialize;
use tracing::debug;

const KIND: &str = "call";

/// Runs a target, optionally setting properties first
///
/// The call shares the executing stack of the surrounding walk, so calling a
/// target that is already running is reported as a cycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallTask {
    /// Target to run
    pub target: Option<String>,

    /// Properties set (after interpolation) before the target runs, in order
    #[serde(deserialize_with = "scalar_pairs")]
    pub params: Vec<(String, String)>,
}

impl CallTask {
    pub fn new(target: impl Into<String>) -> Self {
        CallTask {
            target: Some(target.into()),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }
}

impl Task for CallTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let name = ctx.require(KIND, "target", self.target.as_ref())?;

        for (param, value) in &self.params {
            let value = ctx.filter(value)?;
            ctx.properties.set(param.clone(), value);
        }

        debug!(task = KIND, callee = %name, "calling target");
        let targets = ctx.targets;
        targets.resolve_and_execute(&name, ctx)
    }
}
