//! Create directories

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::os_call;
use serde::Deserialize;
use std::fs;

const KIND: &str = "mkdir";

/// Creates a directory and any missing parents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MkdirTask {
    pub dir: Option<String>,
}

impl MkdirTask {
    pub fn new(dir: impl Into<String>) -> Self {
        MkdirTask {
            dir: Some(dir.into()),
        }
    }
}

impl Task for MkdirTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let dir = ctx.require(KIND, "dir", self.dir.as_ref())?;
        let path = ctx.resolve_path(dir);
        os_call(KIND, "create directory", &path, || fs::create_dir_all(&path))?;
        Ok(())
    }
}
