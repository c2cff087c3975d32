//! Move or rename files and directories

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{ensure_parent, into_directory, os_call, Fileset};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

const KIND: &str = "move";

/// Renames a path, or moves the files of a fileset into a directory
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoveTask {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub fileset: Option<Fileset>,
}

impl MoveTask {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        MoveTask {
            source: Some(source.into()),
            destination: Some(destination.into()),
            fileset: None,
        }
    }

    pub fn fileset(fileset: Fileset, destination: impl Into<String>) -> Self {
        MoveTask {
            fileset: Some(fileset),
            destination: Some(destination.into()),
            source: None,
        }
    }
}

/// Rename, falling back to copy and remove for files on another filesystem
fn move_path(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    let metadata = os_call(KIND, "read", from, || fs::symlink_metadata(from))?;
    if metadata.is_dir() {
        // directories are only renamed; report the original failure
        os_call(KIND, "rename", from, || fs::rename(from, to))?;
        return Ok(());
    }

    debug!(task = KIND, from = %from.display(), "rename failed, copying instead");
    os_call(KIND, "copy", from, || fs::copy(from, to))?;
    os_call(KIND, "delete", from, || fs::remove_file(from))?;
    Ok(())
}

impl Task for MoveTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        if self.source.is_none() && self.fileset.is_none() {
            return Err(ctx.missing(KIND, "source").into());
        }
        let destination =
            ctx.resolve_path(ctx.require(KIND, "destination", self.destination.as_ref())?);

        if let Some(source) = ctx.filter_opt(self.source.as_ref())? {
            let source = ctx.resolve_path(source);
            let target = into_directory(&source, &destination);
            ensure_parent(KIND, &target)?;
            move_path(&source, &target)?;
        }

        if let Some(fileset) = &self.fileset {
            if !destination.is_dir() {
                return Err(ctx
                    .invalid(
                        KIND,
                        format!(
                            "destination '{}' must be an existing directory when moving a fileset",
                            destination.display()
                        ),
                    )
                    .into());
            }
            for entry in fileset.resolve(KIND, ctx)? {
                let target = destination.join(&entry.relative);
                ensure_parent(KIND, &target)?;
                move_path(&entry.path, &target)?;
            }
        }
        Ok(())
    }
}
