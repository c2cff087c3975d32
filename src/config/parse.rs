//! Build file discovery, parsing and project loading

use crate::config::schema::validate_targets;
use crate::config::types::{BuildFile, TargetDef, TaskDef};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::properties::{DEFAULT_TARGET, PROJECT_NAME};
use crate::runner::{Project, Target, Task};
use crate::tasks;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build file names to search for, in order
pub const BUILD_FILE_NAMES: &[&str] = &["brisk.yml", "brisk.yaml"];

/// Find the build file by searching the current and parent directories
pub fn find_build_file() -> ConfigResult<PathBuf> {
    find_build_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the build file starting from a specific directory
pub fn find_build_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in BUILD_FILE_NAMES {
            let path = current_dir.join(file_name);
            if path.is_file() {
                return Ok(path);
            }
            searched_paths.push(path.display().to_string());
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Read and parse a build file
pub fn parse_build_file(path: &Path) -> Result<BuildFile> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    parse_build(&contents)
}

/// Parse a build file from a string
pub fn parse_build(yaml: &str) -> Result<BuildFile> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Build a ready-to-run project from a parsed build file
///
/// Properties are seeded in this order, later sources winning: built-ins and
/// the environment, `name`/`default`, the build file's `properties`, then
/// `overrides` (the CLI's `-D` values).
pub fn load_project(
    build: BuildFile,
    build_file: &Path,
    overrides: &[(String, String)],
) -> Result<Project> {
    let basedir = resolve_basedir(build_file, build.basedir.as_deref())?;

    let mut project = Project::new(basedir);

    if let Some(name) = build.name {
        project.properties.set(PROJECT_NAME, name.clone());
        project.name = Some(name);
    }
    if let Some(default) = build.default {
        project.properties.set(DEFAULT_TARGET, default);
    }
    if let Some(interpreter) = build.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid("interpreter must not be empty".to_string()).into());
        }
        project.interpreter = interpreter;
    }

    project.properties.extend(build.properties);
    project.properties.extend(overrides.iter().cloned());

    for def in build.tasks {
        project.tasks.push_boxed(build_task(def)?);
    }
    for def in build.targets {
        project.targets.add(build_target(def)?)?;
    }

    validate_targets(&project.targets)?;

    debug!(
        build_file = %build_file.display(),
        targets = project.targets.len(),
        tasks = project.tasks.len(),
        "loaded build file"
    );
    Ok(project)
}

/// Absolute base directory: the build file's directory joined with `basedir`
///
/// A bare file name such as `brisk.yml` has an empty parent, which stands for
/// the current directory.
pub fn resolve_basedir(build_file: &Path, basedir: Option<&str>) -> ConfigResult<PathBuf> {
    let file_dir = build_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = match basedir {
        Some(basedir) => file_dir.join(basedir),
        None => file_dir.to_path_buf(),
    };
    std::path::absolute(&dir).map_err(|e| {
        ConfigError::Invalid(format!(
            "Failed to resolve base directory '{}': {}",
            dir.display(),
            e
        ))
    })
}

/// Parse and load a build file in one step
pub fn load_build_file(path: &Path, overrides: &[(String, String)]) -> Result<Project> {
    let build = parse_build_file(path)?;
    load_project(build, path, overrides)
}

fn build_task(def: TaskDef) -> ConfigResult<Box<dyn Task>> {
    tasks::from_yaml(&def.kind, def.body)
}

fn build_target(def: TargetDef) -> Result<Target> {
    let mut target = Target::new(def.name)?
        .with_depends(def.depends)
        .with_if(def.if_props)
        .with_unless(def.unless_props)
        .hidden(def.hidden);
    if let Some(description) = def.description {
        target = target.with_description(description);
    }
    for task in def.tasks {
        target.tasks.push_boxed(build_task(task)?);
    }
    Ok(target)
}
