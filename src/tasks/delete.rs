//! Delete files and directory trees

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{io_error, os_call, selected_paths, walk_error, Fileset};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const KIND: &str = "delete";

/// Removes a path (recursively) or the files of a fileset
///
/// Deleting a path that does not exist succeeds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeleteTask {
    pub path: Option<String>,
    pub fileset: Option<Fileset>,

    /// Descend into directories reached through symbolic links
    pub follow_symlinks: bool,
}

impl DeleteTask {
    pub fn new(path: impl Into<String>) -> Self {
        DeleteTask {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(task = KIND, path = %path.display(), "nothing to delete");
                return Ok(());
            }
            Err(e) => return Err(io_error(KIND, "inspect", path, e).into()),
        };

        // a link is removed itself unless asked to follow it
        let follow_root = self.follow_symlinks && metadata.file_type().is_symlink() && path.is_dir();
        if !metadata.is_dir() && !follow_root {
            os_call(KIND, "delete", path, || fs::remove_file(path))?;
            return Ok(());
        }

        let walker = WalkDir::new(path)
            .contents_first(true)
            .follow_links(self.follow_symlinks);
        for entry in walker {
            let entry = entry.map_err(|e| walk_error(KIND, path, e))?;
            let current = entry.path();

            if entry.file_type().is_dir() && !entry.path_is_symlink() {
                os_call(KIND, "delete directory", current, || fs::remove_dir(current))?;
            } else if entry.file_type().is_dir() {
                // followed link: its contents are gone, remove the link
                os_call(KIND, "delete", current, || remove_link(current))?;
            } else {
                os_call(KIND, "delete", current, || fs::remove_file(current))?;
            }
        }
        Ok(())
    }
}

#[cfg(windows)]
fn remove_link(path: &Path) -> std::io::Result<()> {
    fs::remove_dir(path)
}

#[cfg(not(windows))]
fn remove_link(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}

impl Task for DeleteTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let paths = selected_paths(KIND, "path", self.path.as_ref(), self.fileset.as_ref(), ctx)?;
        for path in paths {
            self.remove(&path)?;
        }
        Ok(())
    }
}
