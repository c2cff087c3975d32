//! Set properties from the build file or from a properties file

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::os_call;
use serde::Deserialize;
use std::fs;
use tracing::debug;

fn default_true() -> bool {
    true
}

/// Sets a single property to an interpolated value
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyTask {
    pub name: Option<String>,
    pub value: Option<String>,

    /// Replace a value that is already set
    #[serde(rename = "override", default = "default_true")]
    pub override_existing: bool,
}

impl Default for PropertyTask {
    fn default() -> Self {
        PropertyTask {
            name: None,
            value: None,
            override_existing: true,
        }
    }
}

impl PropertyTask {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        PropertyTask {
            name: Some(name.into()),
            value: Some(value.into()),
            override_existing: true,
        }
    }
}

impl Task for PropertyTask {
    fn kind(&self) -> &'static str {
        "property"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let name = ctx.require("property", "name", self.name.as_ref())?;
        if !self.override_existing && ctx.properties.has(&name) {
            debug!(task = "property", property = %name, "keeping existing value");
            return Ok(());
        }

        let value = ctx.require("property", "value", self.value.as_ref())?;
        ctx.properties.set(name, value);
        Ok(())
    }
}

/// Loads `key=value` pairs from a file into the property store
///
/// Values are stored raw, so references inside them resolve when used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyFileTask {
    pub file: Option<String>,

    /// Prepended to every key, joined with a dot
    pub prefix: Option<String>,

    #[serde(rename = "override", default = "default_true")]
    pub override_existing: bool,
}

impl Default for PropertyFileTask {
    fn default() -> Self {
        PropertyFileTask {
            file: None,
            prefix: None,
            override_existing: true,
        }
    }
}

impl PropertyFileTask {
    pub fn new(file: impl Into<String>) -> Self {
        PropertyFileTask {
            file: Some(file.into()),
            ..Default::default()
        }
    }
}

impl Task for PropertyFileTask {
    fn kind(&self) -> &'static str {
        "propertyfile"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let file = ctx.require("propertyfile", "file", self.file.as_ref())?;
        let path = ctx.resolve_path(file);
        let content = os_call("propertyfile", "read", &path, || fs::read_to_string(&path))?;

        let prefix = match ctx.filter_opt(self.prefix.as_ref())? {
            Some(p) if !p.is_empty() && !p.ends_with('.') => format!("{}.", p),
            Some(p) => p,
            None => String::new(),
        };

        let pairs = parse_properties(&content);
        debug!(task = "propertyfile", count = pairs.len(), path = %path.display(), "loaded properties");
        for (key, value) in pairs {
            let key = format!("{}{}", prefix, key);
            if self.override_existing || !ctx.properties.has(&key) {
                ctx.properties.set(key, value);
            }
        }
        Ok(())
    }
}

/// Parse properties-file text into key/value pairs, in file order
///
/// Supports `=` and `:` separators, `#` and `!` comments, and lines continued
/// with a trailing backslash.
pub fn parse_properties(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut pending = String::new();

    for line in content.lines() {
        let line = line.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        if continues(line) {
            pending.push_str(&line[..line.len() - 1]);
            continue;
        }
        pending.push_str(line);

        let logical = std::mem::take(&mut pending);
        pairs.push(split_pair(&logical));
    }

    if !pending.is_empty() {
        pairs.push(split_pair(&pending));
    }
    pairs
}

/// A line continues when it ends with an odd number of backslashes
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_pair(line: &str) -> (String, String) {
    match line.find(['=', ':']) {
        Some(i) => (
            line[..i].trim_end().to_string(),
            line[i + 1..].trim_start().to_string(),
        ),
        None => (line.trim_end().to_string(), String::new()),
    }
}
