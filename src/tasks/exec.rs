//! Run external commands through the interpreter

use crate::error::{Result, TaskError};
use crate::runner::{Context, Task};
use crate::tasks::os_call;
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{error, info};

const KIND: &str = "exec";

/// Runs a command line through the project interpreter (e.g. `sh -c`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecTask {
    pub command: Option<String>,

    /// Directory to run in, relative to the working directory
    pub dir: Option<String>,

    /// Print the command's stdout when it succeeds
    pub output: bool,

    /// Print the command's stderr when it fails
    pub error: bool,

    /// Store the trimmed stdout in this property
    pub outputproperty: Option<String>,
}

impl Default for ExecTask {
    fn default() -> Self {
        ExecTask {
            command: None,
            dir: None,
            output: true,
            error: true,
            outputproperty: None,
        }
    }
}

impl ExecTask {
    pub fn new(command: impl Into<String>) -> Self {
        ExecTask {
            command: Some(command.into()),
            ..Default::default()
        }
    }
}

impl Task for ExecTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let command_line = ctx.require(KIND, "command", self.command.as_ref())?;
        let working_dir = match ctx.filter_opt(self.dir.as_ref())? {
            Some(dir) => ctx.resolve_path(dir),
            None => ctx.working_dir.clone(),
        };

        let (program, args) = ctx
            .interpreter
            .split_first()
            .ok_or_else(|| ctx.invalid(KIND, "interpreter is empty"))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .arg(&command_line)
            .current_dir(&working_dir)
            .stdin(Stdio::null());

        info!(task = KIND, command = %command_line, "running");
        let result = os_call(KIND, "run", Path::new(program), || command.output())?;

        if !result.status.success() {
            if self.error {
                io::stderr().write_all(&result.stderr)?;
            }
            error!(task = KIND, code = ?result.status.code(), "command failed");
            return Err(TaskError::CommandFailed {
                command: command_line,
                code: result.status.code(),
            }
            .into());
        }

        if self.output {
            ctx.output.write_all(&result.stdout)?;
        }
        if let Some(property) = ctx.filter_opt(self.outputproperty.as_ref())? {
            let stdout = String::from_utf8_lossy(&result.stdout);
            ctx.properties.set(property, stdout.trim_end());
        }
        Ok(())
    }
}
