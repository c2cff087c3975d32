//! Create files or update their modification time

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{ensure_parent, os_call};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::time::SystemTime;

const KIND: &str = "touch";

/// Creates a file if missing and sets its modification time to now
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TouchTask {
    pub file: Option<String>,

    /// Create missing parent directories
    pub mkdirs: bool,
}

impl TouchTask {
    pub fn new(file: impl Into<String>) -> Self {
        TouchTask {
            file: Some(file.into()),
            mkdirs: false,
        }
    }
}

impl Task for TouchTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let file = ctx.require(KIND, "file", self.file.as_ref())?;
        let path = ctx.resolve_path(file);

        if self.mkdirs {
            ensure_parent(KIND, &path)?;
        }

        os_call(KIND, "touch", &path, || {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.set_modified(SystemTime::now())
        })?;
        Ok(())
    }
}
