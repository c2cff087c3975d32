//! Create symbolic links

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{ensure_parent, os_call};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::Path;

const KIND: &str = "symlink";

/// Creates `link` pointing at `target`
///
/// The target is stored as written; a relative target is relative to the
/// link's directory.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymlinkTask {
    pub target: Option<String>,
    pub link: Option<String>,

    /// Replace an existing file or link at `link`
    pub overwrite: bool,
}

impl SymlinkTask {
    pub fn new(target: impl Into<String>, link: impl Into<String>) -> Self {
        SymlinkTask {
            target: Some(target.into()),
            link: Some(link.into()),
            overwrite: false,
        }
    }
}

impl Task for SymlinkTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let target = ctx.require(KIND, "target", self.target.as_ref())?;
        let link = ctx.resolve_path(ctx.require(KIND, "link", self.link.as_ref())?);

        if let Ok(existing) = fs::symlink_metadata(&link) {
            if !self.overwrite {
                return Err(ctx
                    .invalid(KIND, format!("'{}' already exists", link.display()))
                    .into());
            }
            if existing.is_dir() {
                return Err(ctx
                    .invalid(KIND, format!("'{}' is a directory", link.display()))
                    .into());
            }
            os_call(KIND, "remove", &link, || fs::remove_file(&link))?;
        }

        ensure_parent(KIND, &link)?;
        os_call(KIND, "create link", &link, || {
            create_symlink(Path::new(&target), &link)
        })?;
        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    let resolved = link.parent().map(|p| p.join(target));
    if resolved.map_or(false, |p| p.is_dir()) {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn create_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
