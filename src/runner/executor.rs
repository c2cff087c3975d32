//! Dependency resolution for target invocation
//!
//! Targets are executed depth-first. The context keeps a stack of targets that
//! are currently executing; meeting one of them again means the dependency
//! graph has a cycle.

use crate::error::{Result, TargetError};
use crate::runner::{Context, Targets, Task};

/// Maximum number of targets executing at once
pub const MAX_TARGET_DEPTH: usize = 256;

impl Targets {
    /// Look up `name` and execute it, dependencies first
    ///
    /// The name stays on the context's executing stack while the target runs
    /// and is popped afterwards whether or not it succeeded.
    pub fn resolve_and_execute(&self, name: &str, ctx: &mut Context<'_>) -> Result<()> {
        if ctx.is_target_in_stack(name) {
            let mut chain = ctx.target_stack.clone();
            chain.push(name.to_string());
            return Err(TargetError::Cycle(chain.join(" -> ")).into());
        }

        if ctx.target_stack.len() >= MAX_TARGET_DEPTH {
            return Err(TargetError::TooDeep(MAX_TARGET_DEPTH).into());
        }

        let target = self.get(name)?;

        ctx.push_target(name.to_string());
        let result = target.execute(ctx);
        ctx.pop_target();

        result
    }
}
