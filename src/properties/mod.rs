//! Build properties
//!
//! The property store is the mutable key/value environment of a build run.
//! Values are stored raw and interpolated on demand with [`PropertyStore::filter`].

pub mod interpolate;

pub use interpolate::{has_references, MAX_RESOLUTION_DEPTH, MAX_SUBSTITUTIONS};

use crate::error::PropertyResult;
use interpolate::Resolver;
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Property naming the target to run when none is requested
pub const DEFAULT_TARGET: &str = "project.default";

/// Property holding the project name
pub const PROJECT_NAME: &str = "project.name";

/// Prefix under which environment variables are imported
pub const ENV_PREFIX: &str = "env.";

/// Insertion-ordered mapping of property names to raw values
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the built-in properties and the environment
    pub fn with_builtins(basedir: &Path) -> Self {
        let mut store = Self::new();
        let basedir = basedir.display().to_string();

        store.set("basedir", basedir.clone());
        store.set("project.basedir", basedir);
        store.set("os.name", env::consts::OS);
        store.set("os.family", env::consts::FAMILY);
        store.set("brisk.version", crate::VERSION);

        if let Some(dirs) = directories::BaseDirs::new() {
            store.set("user.home", dirs.home_dir().display().to_string());
        }

        store.import_env(ENV_PREFIX);
        store
    }

    /// Import every environment variable as `<prefix><NAME>`
    pub fn import_env(&mut self, prefix: &str) {
        // non-unicode variables are skipped
        let mut vars: Vec<(String, String)> = env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        vars.sort();
        for (key, value) in vars {
            self.set(format!("{}{}", prefix, key), value);
        }
    }

    /// Exact lookup, no interpolation
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Insert or update a raw value
    ///
    /// Updating an existing property keeps its original position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.values.insert(name, value.into());
    }

    /// Check whether a property is set
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a property, returning its raw value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let value = self.values.remove(name)?;
        self.order.retain(|n| n != name);
        Some(value)
    }

    /// Iterate over properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve every `${name}` reference in `input`
    pub fn filter(&self, input: &str) -> PropertyResult<String> {
        Resolver::new(self).resolve_str(input)
    }

    /// Resolve a property by name, interpolating its value
    pub fn resolve(&self, name: &str) -> PropertyResult<String> {
        Resolver::new(self).resolve_name(name)
    }

    /// Evaluate a property as a guard condition
    ///
    /// Unset and empty (after interpolation) are false; any other value is true,
    /// including "false" and "0".
    pub fn is_truthy(&self, name: &str) -> PropertyResult<bool> {
        if !self.has(name) {
            return Ok(false);
        }
        Ok(!self.resolve(name)?.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PropertyStore {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}
