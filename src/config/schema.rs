//! Build file validation
//!
//! Checks the dependency graph of a loaded target registry before anything
//! runs. `call` tasks are resolved at run time and are not part of the graph.

use crate::error::{ConfigError, ConfigResult};
use crate::runner::{Targets, MAX_TARGET_DEPTH};
use std::collections::HashSet;

/// Validate the dependency graph of `targets`
pub fn validate_targets(targets: &Targets) -> ConfigResult<()> {
    for target in targets.iter() {
        for dependency in &target.depends {
            if !targets.contains(dependency) {
                return Err(ConfigError::UndefinedDependency {
                    target: target.name().to_string(),
                    dependency: dependency.clone(),
                });
            }
        }
    }

    detect_circular_dependencies(targets)
}

/// Detect cycles in the static `depends` graph
fn detect_circular_dependencies(targets: &Targets) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for target in targets.iter() {
        let mut stack = Vec::new();
        check_target_cycle(targets, target.name(), &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Depth-first walk reporting the first cycle as "a -> b -> a"
fn check_target_cycle(
    targets: &Targets,
    name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    if let Some(start) = stack.iter().position(|n| n == name) {
        let mut chain = stack[start..].to_vec();
        chain.push(name.to_string());
        return Err(ConfigError::CircularDependency(chain.join(" -> ")));
    }

    if visited.contains(name) {
        return Ok(());
    }

    if stack.len() >= MAX_TARGET_DEPTH {
        return Err(ConfigError::Invalid(format!(
            "dependency chain of '{}' is deeper than {} targets",
            stack[0], MAX_TARGET_DEPTH
        )));
    }

    let target = targets
        .get(name)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    stack.push(name.to_string());
    for dependency in &target.depends {
        check_target_cycle(targets, dependency, visited, stack)?;
    }
    stack.pop();
    visited.insert(name.to_string());

    Ok(())
}
