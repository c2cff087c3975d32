//! Change the working directory of the build

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::os_call;
use serde::Deserialize;
use std::fs;
use tracing::debug;

const KIND: &str = "chdir";

/// Changes the directory relative paths are resolved against
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChdirTask {
    pub dir: Option<String>,
}

impl ChdirTask {
    pub fn new(dir: impl Into<String>) -> Self {
        ChdirTask {
            dir: Some(dir.into()),
        }
    }
}

impl Task for ChdirTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let dir = ctx.require(KIND, "dir", self.dir.as_ref())?;
        let path = ctx.resolve_path(dir);

        let metadata = os_call(KIND, "open directory", &path, || fs::metadata(&path))?;
        if !metadata.is_dir() {
            return Err(ctx
                .invalid(KIND, format!("'{}' is not a directory", path.display()))
                .into());
        }

        debug!(task = KIND, dir = %path.display(), "changing working directory");
        ctx.working_dir = path;
        Ok(())
    }
}
