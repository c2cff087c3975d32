//! Build file types
//!
//! This module defines the data structures that represent a brisk.yml build
//! file, plus the lenient deserializers shared with the task definitions.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Top-level build file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildFile {
    /// Project name, exposed as `project.name`
    #[serde(default)]
    pub name: Option<String>,

    /// Target run when none is requested, exposed as `project.default`
    #[serde(default)]
    pub default: Option<String>,

    /// Base directory, relative to the build file's directory
    #[serde(default)]
    pub basedir: Option<String>,

    /// Interpreter for `exec` commands (e.g., ["sh", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Properties in declaration order
    #[serde(default, deserialize_with = "scalar_pairs")]
    pub properties: Vec<(String, String)>,

    /// Tasks run before any target
    #[serde(default)]
    pub tasks: Vec<TaskDef>,

    /// Target definitions in declaration order
    #[serde(default)]
    pub targets: Vec<TargetDef>,
}

/// A target definition
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetDef {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Hidden targets are left out of `--list`
    #[serde(default)]
    pub hidden: bool,

    #[serde(default, deserialize_with = "string_or_seq")]
    pub depends: Vec<String>,

    #[serde(default, rename = "if", deserialize_with = "string_or_seq")]
    pub if_props: Vec<String>,

    #[serde(default, rename = "unless", deserialize_with = "string_or_seq")]
    pub unless_props: Vec<String>,

    #[serde(default)]
    pub tasks: Vec<TaskDef>,
}

/// A task entry: a single-key mapping from task kind to its configuration
///
/// The body is kept as YAML until the project is built so unknown kinds are
/// reported as configuration errors rather than parse errors.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDef {
    pub kind: String,
    pub body: Value,
}

impl<'de> Deserialize<'de> for TaskDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mapping = match Value::deserialize(deserializer)? {
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(de::Error::custom(format!(
                    "task must be a single-key mapping, found {}",
                    describe(&other)
                )))
            }
        };

        if mapping.len() != 1 {
            return Err(de::Error::custom(format!(
                "task must be a single-key mapping, found {} keys",
                mapping.len()
            )));
        }

        let (key, body) = mapping
            .into_iter()
            .next()
            .ok_or_else(|| de::Error::custom("empty task entry"))?;
        match key {
            Value::String(kind) => Ok(TaskDef { kind, body }),
            other => Err(de::Error::custom(format!(
                "task kind must be a string, found {}",
                describe(&other)
            ))),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Stringify a scalar; `None` for sequences, mappings and tags
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn expect_scalar<E: de::Error>(value: &Value, what: &dyn fmt::Display) -> Result<String, E> {
    scalar_to_string(value).ok_or_else(|| {
        E::custom(format!("{} must be a scalar, found {}", what, describe(value)))
    })
}

/// Accept a comma separated string or a sequence of scalars
///
/// Sequence entries are taken whole, so they may contain commas.
pub(crate) fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Vec<String> = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Sequence(seq) => seq
            .iter()
            .map(|item| expect_scalar(item, &"list entry"))
            .collect::<Result<_, D::Error>>()?,
        other => expect_scalar::<D::Error>(&other, &"value")?
            .split(',')
            .map(str::to_string)
            .collect(),
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}

/// Accept a mapping of scalars, keeping declaration order
pub(crate) fn scalar_pairs<'de, D>(deserializer: D) -> Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    let mapping = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        other => {
            return Err(de::Error::custom(format!(
                "expected a mapping, found {}",
                describe(&other)
            )))
        }
    };

    mapping
        .iter()
        .map(|(key, value)| {
            let key = expect_scalar::<D::Error>(key, &"key")?;
            let value = expect_scalar(value, &format!("value of '{}'", key))?;
            Ok((key, value))
        })
        .collect()
}

/// Accept a mapping of scalars
pub(crate) fn scalar_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_pairs(deserializer)?.into_iter().collect())
}

/// Accept an optional scalar, so `mode: 755` reads as "755"
pub(crate) fn opt_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        other => expect_scalar(&other, &"value").map(Some),
    }
}
