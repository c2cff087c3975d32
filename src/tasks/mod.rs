//! Built-in tasks
//!
//! Each task is a plain struct deserialized from the build file. String fields
//! are interpolated when the task runs, never when it is loaded.

pub mod call;
pub mod chdir;
pub mod copy;
pub mod delete;
pub mod echo;
pub mod exec;
pub mod fileset;
pub mod input;
pub mod mkdir;
pub mod mv;
pub mod ownership;
pub mod property;
pub mod symlink;
pub mod tokenfilter;
pub mod touch;

pub use call::CallTask;
pub use chdir::ChdirTask;
pub use copy::CopyTask;
pub use delete::DeleteTask;
pub use echo::EchoTask;
pub use exec::ExecTask;
pub use fileset::{FileEntry, Fileset, FilesetTask};
pub use input::InputTask;
pub use mkdir::MkdirTask;
pub use mv::MoveTask;
pub use ownership::{ChgrpTask, ChmodTask, ChownTask};
pub use property::{PropertyFileTask, PropertyTask};
pub use symlink::SymlinkTask;
pub use tokenfilter::TokenFilterTask;
pub use touch::TouchTask;

use crate::error::{ConfigError, ConfigResult, Result, TaskError, TaskResult};
use crate::runner::{Context, Task};
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Task types that can appear in a build file
pub const TASK_KINDS: &[&str] = &[
    "call",
    "chdir",
    "chgrp",
    "chmod",
    "chown",
    "copy",
    "delete",
    "echo",
    "exec",
    "fileset",
    "input",
    "mkdir",
    "move",
    "property",
    "propertyfile",
    "symlink",
    "tokenfilter",
    "touch",
];

/// Build a task from its build-file key and configuration value
pub fn from_yaml(kind: &str, value: Value) -> ConfigResult<Box<dyn Task>> {
    let task: Box<dyn Task> = match kind {
        "call" => Box::new(parse::<CallTask>(kind, value)?),
        "chdir" => Box::new(parse::<ChdirTask>(kind, value)?),
        "chgrp" => Box::new(parse::<ChgrpTask>(kind, value)?),
        "chmod" => Box::new(parse::<ChmodTask>(kind, value)?),
        "chown" => Box::new(parse::<ChownTask>(kind, value)?),
        "copy" => Box::new(parse::<CopyTask>(kind, value)?),
        "delete" => Box::new(parse::<DeleteTask>(kind, value)?),
        "echo" => match value {
            Value::String(message) => Box::new(EchoTask::new(message)),
            other => Box::new(parse::<EchoTask>(kind, other)?),
        },
        "exec" => match value {
            Value::String(command) => Box::new(ExecTask::new(command)),
            other => Box::new(parse::<ExecTask>(kind, other)?),
        },
        "fileset" => Box::new(parse::<FilesetTask>(kind, value)?),
        "input" => Box::new(parse::<InputTask>(kind, value)?),
        "mkdir" => Box::new(parse::<MkdirTask>(kind, value)?),
        "move" => Box::new(parse::<MoveTask>(kind, value)?),
        "property" => Box::new(parse::<PropertyTask>(kind, value)?),
        "propertyfile" => Box::new(parse::<PropertyFileTask>(kind, value)?),
        "symlink" => Box::new(parse::<SymlinkTask>(kind, value)?),
        "tokenfilter" => Box::new(parse::<TokenFilterTask>(kind, value)?),
        "touch" => Box::new(parse::<TouchTask>(kind, value)?),
        other => return Err(ConfigError::UnknownTask(other.to_string())),
    };
    Ok(task)
}

fn parse<T: DeserializeOwned>(kind: &str, value: Value) -> ConfigResult<T> {
    // `- mkdir:` with no body is an all-defaults task
    let value = match value {
        Value::Null => Value::Mapping(Default::default()),
        other => other,
    };
    serde_yaml::from_value(value)
        .map_err(|e| ConfigError::Invalid(format!("task '{}': {}", kind, e)))
}

/// Wrap an I/O failure with the task, action and path involved
pub fn io_error(task: &'static str, action: &str, path: &Path, source: io::Error) -> TaskError {
    TaskError::Io {
        task,
        action: action.to_string(),
        path: path.to_path_buf(),
        source,
    }
}

/// Wrap a directory-walk failure, naming the entry that failed when known
pub fn walk_error(task: &'static str, root: &Path, error: walkdir::Error) -> TaskError {
    let path = error.path().unwrap_or(root).to_path_buf();
    io_error(task, "walk", &path, error.into())
}

/// Perform an OS call, surfacing any failure through the task error channel
pub fn os_call<T>(
    task: &'static str,
    action: &str,
    path: &Path,
    f: impl FnOnce() -> io::Result<T>,
) -> TaskResult<T> {
    debug!(task, action, path = %path.display(), "filesystem call");
    f().map_err(|source| io_error(task, action, path, source))
}

/// Destination for `source` when `destination` may be an existing directory
///
/// Like `mv`/`cp`, a directory destination receives the source's base name.
pub fn into_directory(source: &Path, destination: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) if destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    }
}

/// Paths selected by a single-path field and/or a fileset
///
/// Fails naming `field` when neither is configured.
pub fn selected_paths(
    task: &'static str,
    field: &'static str,
    single: Option<&String>,
    fileset: Option<&Fileset>,
    ctx: &Context<'_>,
) -> Result<Vec<PathBuf>> {
    if single.is_none() && fileset.is_none() {
        return Err(ctx.missing(task, field).into());
    }

    let mut paths = Vec::new();
    if let Some(path) = single {
        paths.push(ctx.resolve_path(ctx.filter(path)?));
    }
    if let Some(fileset) = fileset {
        paths.extend(fileset.resolve(task, ctx)?.into_iter().map(|e| e.path));
    }
    Ok(paths)
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent(task: &'static str, path: &Path) -> TaskResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            os_call(task, "create directory", parent, || std::fs::create_dir_all(parent))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers for running single tasks against a scratch directory

    use crate::error::Result;
    use crate::properties::PropertyStore;
    use crate::runner::{Context, Targets, Task};
    use std::path::Path;

    /// Run `task` with `dir` as working directory and `basedir` set
    pub fn run_in(dir: &Path, props: &mut PropertyStore, task: &dyn Task) -> Result<String> {
        props.set("basedir", dir.display().to_string());
        let targets = Targets::new();
        let mut out = Vec::new();
        let result = {
            let mut ctx = Context::new(props, &targets)
                .with_working_dir(dir.to_path_buf())
                .with_input(std::io::empty())
                .with_output(&mut out);
            task.execute(&mut ctx)
        };
        result.map(|_| String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_yaml_unknown_kind() {
        let err = from_yaml("phpscript", Value::Null).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTask(ref k) if k == "phpscript"));
    }

    #[test]
    fn test_from_yaml_every_kind_accepts_empty_body() {
        for kind in TASK_KINDS {
            let task = from_yaml(kind, Value::Null).unwrap();
            assert_eq!(task.kind(), *kind);
        }
    }

    #[test]
    fn test_from_yaml_rejects_unknown_fields() {
        let value: Value = serde_yaml::from_str("{ dir: build, colour: red }").unwrap();
        assert!(matches!(
            from_yaml("mkdir", value),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_into_directory() {
        let temp = TempDir::new().unwrap();
        let src = Path::new("/some/where/file.txt");

        assert_eq!(into_directory(src, temp.path()), temp.path().join("file.txt"));

        let missing = temp.path().join("renamed.txt");
        assert_eq!(into_directory(src, &missing), missing);
    }

    #[test]
    fn test_os_call_wraps_error() {
        let path = Path::new("/definitely/not/here");
        let err = os_call("copy", "read", path, || std::fs::read(path)).unwrap_err();
        match err {
            TaskError::Io {
                task,
                action,
                path: p,
                source,
            } => {
                assert_eq!(task, "copy");
                assert_eq!(action, "read");
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
