//! Replace delimited tokens in a file

use crate::config::types::scalar_map;
use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::os_call;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use tracing::debug;

const KIND: &str = "tokenfilter";

/// Replaces `@token@` style markers in a file with interpolated values
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenFilterTask {
    pub file: Option<String>,

    #[serde(deserialize_with = "scalar_map")]
    pub tokens: BTreeMap<String, String>,

    pub begintoken: String,
    pub endtoken: String,
}

impl Default for TokenFilterTask {
    fn default() -> Self {
        TokenFilterTask {
            file: None,
            tokens: BTreeMap::new(),
            begintoken: "@".to_string(),
            endtoken: "@".to_string(),
        }
    }
}

impl TokenFilterTask {
    pub fn new(file: impl Into<String>) -> Self {
        TokenFilterTask {
            file: Some(file.into()),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(name.into(), value.into());
        self
    }
}

impl Task for TokenFilterTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let file = ctx.require(KIND, "file", self.file.as_ref())?;
        if self.begintoken.is_empty() || self.endtoken.is_empty() {
            return Err(ctx
                .invalid(KIND, "begintoken and endtoken must not be empty")
                .into());
        }

        let mut values = HashMap::new();
        for (name, value) in &self.tokens {
            values.insert(name.as_str(), ctx.filter(value)?);
        }

        let path = ctx.resolve_path(file);
        let content = os_call(KIND, "read", &path, || fs::read_to_string(&path))?;
        let (filtered, count) = replace_tokens(&content, &self.begintoken, &self.endtoken, &values);

        debug!(task = KIND, replaced = count, path = %path.display(), "filtered tokens");
        if count > 0 {
            os_call(KIND, "write", &path, || fs::write(&path, filtered))?;
        }
        Ok(())
    }
}

/// Single left-to-right pass; replaced text is never rescanned
fn replace_tokens(
    content: &str,
    begin: &str,
    end: &str,
    values: &HashMap<&str, String>,
) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    let mut count = 0;

    while let Some(start) = rest.find(begin) {
        out.push_str(&rest[..start]);
        let after_begin = &rest[start + begin.len()..];

        let replacement = after_begin
            .find(end)
            .and_then(|stop| values.get(&after_begin[..stop]).map(|v| (stop, v)));

        match replacement {
            Some((stop, value)) => {
                out.push_str(value);
                rest = &after_begin[stop + end.len()..];
                count += 1;
            }
            None => {
                out.push_str(begin);
                rest = after_begin;
            }
        }
    }
    out.push_str(rest);
    (out, count)
}
