//! Prompt the user for a property value

use crate::config::types::string_or_seq;
use crate::error::{Result, TaskError};
use crate::runner::{Context, Task};
use serde::Deserialize;
use std::io::{BufRead, Write};
use tracing::debug;

const KIND: &str = "input";

/// Reads a line from the input stream into a property
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputTask {
    pub propertyname: Option<String>,
    pub message: Option<String>,

    /// Accepted answers; empty accepts anything
    #[serde(deserialize_with = "string_or_seq")]
    pub validargs: Vec<String>,

    /// Used when the answer is blank
    pub defaultvalue: Option<String>,

    pub promptchar: String,
}

impl Default for InputTask {
    fn default() -> Self {
        InputTask {
            propertyname: None,
            message: None,
            validargs: Vec::new(),
            defaultvalue: None,
            promptchar: "?".to_string(),
        }
    }
}

impl InputTask {
    pub fn new(propertyname: impl Into<String>) -> Self {
        InputTask {
            propertyname: Some(propertyname.into()),
            ..Default::default()
        }
    }

    fn prompt(&self, ctx: &Context<'_>, validargs: &[String]) -> Result<String> {
        let mut prompt = ctx.filter_opt(self.message.as_ref())?.unwrap_or_default();
        if !validargs.is_empty() {
            if !prompt.is_empty() {
                prompt.push(' ');
            }
            prompt.push_str(&format!("[{}]", validargs.join(",")));
        }
        prompt.push_str(&self.promptchar);
        prompt.push(' ');
        Ok(prompt)
    }
}

impl Task for InputTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let name = ctx.require(KIND, "propertyname", self.propertyname.as_ref())?;
        let validargs = self
            .validargs
            .iter()
            .map(|arg| ctx.filter(arg))
            .collect::<Result<Vec<_>>>()?;

        let prompt = self.prompt(ctx, &validargs)?;
        write!(ctx.output, "{}", prompt)?;
        ctx.output.flush()?;

        // end of input counts as a blank answer
        let mut line = String::new();
        ctx.input.read_line(&mut line)?;
        let mut answer = line.trim().to_string();

        if answer.is_empty() {
            if let Some(default) = ctx.filter_opt(self.defaultvalue.as_ref())? {
                answer = default;
            }
        }

        if !validargs.is_empty() && !validargs.contains(&answer) {
            return Err(TaskError::InvalidInput {
                value: answer,
                valid: validargs.join(", "),
            }
            .into());
        }

        debug!(task = KIND, property = %name, "storing answer");
        ctx.properties.set(name, answer);
        Ok(())
    }
}
