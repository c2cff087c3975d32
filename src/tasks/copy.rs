//! Copy files and directory trees

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{ensure_parent, into_directory, os_call, walk_error, Fileset};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const KIND: &str = "copy";

/// Copies a file, a directory tree or the files of a fileset
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyTask {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub fileset: Option<Fileset>,

    /// Replace files that already exist at the destination
    pub overwrite: bool,
}

impl Default for CopyTask {
    fn default() -> Self {
        CopyTask {
            source: None,
            destination: None,
            fileset: None,
            overwrite: true,
        }
    }
}

impl CopyTask {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        CopyTask {
            source: Some(source.into()),
            destination: Some(destination.into()),
            ..Default::default()
        }
    }

    pub fn fileset(fileset: Fileset, destination: impl Into<String>) -> Self {
        CopyTask {
            fileset: Some(fileset),
            destination: Some(destination.into()),
            ..Default::default()
        }
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        if !self.overwrite && to.exists() {
            debug!(task = KIND, path = %to.display(), "destination exists, skipping");
            return Ok(());
        }
        ensure_parent(KIND, to)?;
        os_call(KIND, "copy", from, || fs::copy(from, to))?;
        Ok(())
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<()> {
        for entry in WalkDir::new(from) {
            let entry = entry.map_err(|e| walk_error(KIND, from, e))?;
            let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
            let target = to.join(relative);

            if entry.file_type().is_dir() {
                os_call(KIND, "create directory", &target, || {
                    fs::create_dir_all(&target)
                })?;
            } else {
                self.copy_file(entry.path(), &target)?;
            }
        }
        Ok(())
    }
}

/// Canonical form of a path that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the missing components
/// are appended to it.
fn resolve_lenient(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut missing = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    match fs::canonicalize(existing) {
        Ok(base) => missing.iter().rev().fold(base, |acc, name| acc.join(name)),
        Err(_) => path.to_path_buf(),
    }
}

impl Task for CopyTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        if self.source.is_none() && self.fileset.is_none() {
            return Err(ctx.missing(KIND, "source").into());
        }
        let destination = ctx.resolve_path(ctx.require(KIND, "destination", self.destination.as_ref())?);

        if let Some(source) = ctx.filter_opt(self.source.as_ref())? {
            let source = ctx.resolve_path(source);
            let metadata = os_call(KIND, "read", &source, || fs::metadata(&source))?;
            let target = into_directory(&source, &destination);

            if metadata.is_dir() {
                let root = os_call(KIND, "resolve", &source, || fs::canonicalize(&source))?;
                if resolve_lenient(&target).starts_with(&root) {
                    return Err(ctx
                        .invalid(
                            KIND,
                            format!(
                                "cannot copy '{}' into itself ('{}')",
                                source.display(),
                                target.display()
                            ),
                        )
                        .into());
                }
                self.copy_tree(&source, &target)?;
            } else {
                self.copy_file(&source, &target)?;
            }
        }

        if let Some(fileset) = &self.fileset {
            // fileset entries keep their path relative to the fileset base
            for entry in fileset.resolve(KIND, ctx)? {
                self.copy_file(&entry.path, &destination.join(&entry.relative))?;
            }
        }
        Ok(())
    }
}
