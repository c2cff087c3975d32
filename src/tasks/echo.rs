//! Write messages to the console or a file

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{ensure_parent, os_call};
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;

const KIND: &str = "echo";

/// Writes a message followed by a newline
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EchoTask {
    pub message: Option<String>,

    /// Write to this file instead of the output stream
    pub file: Option<String>,

    /// Append to `file` instead of truncating it
    pub append: bool,
}

impl EchoTask {
    pub fn new(message: impl Into<String>) -> Self {
        EchoTask {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

impl Task for EchoTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let message = ctx.require(KIND, "message", self.message.as_ref())?;

        match ctx.filter_opt(self.file.as_ref())? {
            Some(file) => {
                let path = ctx.resolve_path(file);
                ensure_parent(KIND, &path)?;
                os_call(KIND, "write", &path, || {
                    let mut file = OpenOptions::new()
                        .create(true)
                        .write(true)
                        .append(self.append)
                        .truncate(!self.append)
                        .open(&path)?;
                    writeln!(file, "{}", message)
                })?;
            }
            None => writeln!(ctx.output, "{}", message)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyStore;
    use crate::tasks::testing::run_in;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_echo_to_output() {
        let temp = TempDir::new().unwrap();
        let mut props = PropertyStore::new();
        props.set("name", "world");

        let out = run_in(temp.path(), &mut props, &EchoTask::new("hello ${name}")).unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[test]
    fn test_echo_to_file_append() {
        let temp = TempDir::new().unwrap();
        let mut props = PropertyStore::new();

        let first = EchoTask {
            file: Some("log/out.txt".to_string()),
            ..EchoTask::new("one")
        };
        let second = EchoTask {
            append: true,
            ..first.clone()
        };
        let second = EchoTask {
            message: Some("two".to_string()),
            ..second
        };

        run_in(temp.path(), &mut props, &first).unwrap();
        run_in(temp.path(), &mut props, &second).unwrap();
        let content = fs::read_to_string(temp.path().join("log/out.txt")).unwrap();
        assert_eq!(content, "one\ntwo\n");
    }
}
