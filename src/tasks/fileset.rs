//! Filesets: sets of files selected by include/exclude patterns

use crate::config::types::string_or_seq;
use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::io_error;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

/// Include pattern used when none is configured
const DEFAULT_INCLUDE: &str = "**/*";

/// Files under a base directory matching include/exclude patterns
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fileset {
    /// Id of a fileset registered with the `fileset` task
    pub refid: Option<String>,

    /// Base directory (defaults to the working directory)
    pub dir: Option<String>,

    /// Glob patterns relative to `dir`
    #[serde(deserialize_with = "string_or_seq")]
    pub include: Vec<String>,

    /// Glob patterns matched against paths relative to `dir`
    #[serde(deserialize_with = "string_or_seq")]
    pub exclude: Vec<String>,
}

/// A file selected by a fileset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path of the file
    pub path: PathBuf,

    /// Path relative to the fileset's base directory
    pub relative: PathBuf,
}

impl Fileset {
    /// Fileset rooted at `dir` selecting everything
    pub fn new(dir: impl Into<String>) -> Self {
        Fileset {
            dir: Some(dir.into()),
            ..Default::default()
        }
    }

    /// Fileset referring to a registered fileset
    pub fn reference(id: impl Into<String>) -> Self {
        Fileset {
            refid: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Collect the matching regular files, sorted by relative path
    pub fn resolve(&self, task: &'static str, ctx: &Context<'_>) -> Result<Vec<FileEntry>> {
        match &self.refid {
            Some(refid) => {
                let id = ctx.filter(refid)?;
                let registered = ctx
                    .filesets
                    .get(&id)
                    .ok_or_else(|| ctx.invalid(task, format!("unknown fileset '{}'", id)))?;
                registered.collect(task, ctx)
            }
            None => self.collect(task, ctx),
        }
    }

    fn collect(&self, task: &'static str, ctx: &Context<'_>) -> Result<Vec<FileEntry>> {
        let base = match &self.dir {
            Some(dir) => ctx.resolve_path(ctx.filter(dir)?),
            None => ctx.working_dir.clone(),
        };

        let includes = if self.include.is_empty() {
            vec![DEFAULT_INCLUDE.to_string()]
        } else {
            self.include
                .iter()
                .map(|p| ctx.filter(p))
                .collect::<Result<Vec<_>>>()?
        };
        let excludes = self.exclude_set(task, ctx)?;

        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        let escaped_base = glob::Pattern::escape(&base.to_string_lossy());

        let mut selected = BTreeSet::new();
        for pattern in &includes {
            let full = format!("{}/{}", escaped_base.trim_end_matches('/'), pattern);
            let matches = glob::glob_with(&full, options).map_err(|e| {
                ctx.invalid(task, format!("invalid include pattern '{}': {}", pattern, e.msg))
            })?;

            for entry in matches {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    io_error(task, "read", &path, io::Error::from(e))
                })?;
                if !path.is_file() {
                    continue;
                }
                let relative = relative_to(&path, &base);
                if excludes.is_match(&relative) {
                    continue;
                }
                selected.insert(relative);
            }
        }

        Ok(selected
            .into_iter()
            .map(|relative| FileEntry {
                path: base.join(&relative),
                relative,
            })
            .collect())
    }

    fn exclude_set(&self, task: &'static str, ctx: &Context<'_>) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.exclude {
            let pattern = ctx.filter(pattern)?;
            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    ctx.invalid(task, format!("invalid exclude pattern '{}': {}", pattern, e))
                })?;
            builder.add(glob);
        }
        Ok(builder
            .build()
            .map_err(|e| ctx.invalid(task, format!("invalid exclude patterns: {}", e)))?)
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Registers a named fileset for later reference by `refid`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilesetTask {
    pub id: Option<String>,
    pub dir: Option<String>,
    #[serde(deserialize_with = "string_or_seq")]
    pub include: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    pub exclude: Vec<String>,
}

const KIND: &str = "fileset";

impl Task for FilesetTask {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let id = ctx.require(KIND, "id", self.id.as_ref())?;
        let fileset = Fileset {
            refid: None,
            dir: self.dir.clone(),
            include: self.include.clone(),
            exclude: self.exclude.clone(),
        };
        ctx.filesets.insert(id, fileset);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BriskError, TaskError};
    use crate::properties::PropertyStore;
    use crate::runner::Targets;
    use std::fs;
    use tempfile::TempDir;

    fn tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("README.md"), "readme").unwrap();
        fs::write(root.join("src/main.rs"), "main").unwrap();
        fs::write(root.join("src/lib.rs"), "lib").unwrap();
        fs::write(root.join("src/nested/util.rs"), "util").unwrap();
        fs::write(root.join("src/nested/notes.txt"), "notes").unwrap();
        temp
    }

    fn relatives(entries: &[FileEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.relative.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_default_include_selects_all_files() {
        let temp = tree();
        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let ctx = Context::new(&mut props, &targets).with_working_dir(temp.path().to_path_buf());

        let entries = Fileset::default().resolve("test", &ctx).unwrap();
        assert_eq!(
            relatives(&entries),
            vec![
                "README.md",
                "src/lib.rs",
                "src/main.rs",
                "src/nested/notes.txt",
                "src/nested/util.rs"
            ]
        );
    }

    #[test]
    fn test_include_and_exclude() {
        let temp = tree();
        let mut props = PropertyStore::new();
        props.set("src", "src");
        let targets = Targets::new();
        let ctx = Context::new(&mut props, &targets).with_working_dir(temp.path().to_path_buf());

        let fileset = Fileset::new("${src}")
            .include("**/*.rs")
            .exclude("nested/*");
        let entries = fileset.resolve("test", &ctx).unwrap();
        assert_eq!(relatives(&entries), vec!["lib.rs", "main.rs"]);
        assert_eq!(entries[0].path, temp.path().join("src").join("lib.rs"));
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let temp = tree();
        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let ctx = Context::new(&mut props, &targets).with_working_dir(temp.path().to_path_buf());

        let entries = Fileset::new("src").include("*.rs").resolve("test", &ctx).unwrap();
        assert_eq!(relatives(&entries), vec!["lib.rs", "main.rs"]);
    }

    #[test]
    fn test_registered_fileset_reference() {
        let temp = tree();
        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let mut ctx =
            Context::new(&mut props, &targets).with_working_dir(temp.path().to_path_buf());

        let task = FilesetTask {
            id: Some("docs".to_string()),
            include: vec!["**/*.txt".to_string(), "*.md".to_string()],
            ..Default::default()
        };
        task.execute(&mut ctx).unwrap();

        let entries = Fileset::reference("docs").resolve("test", &ctx).unwrap();
        assert_eq!(relatives(&entries), vec!["README.md", "src/nested/notes.txt"]);
    }

    #[test]
    fn test_unknown_reference() {
        let mut props = PropertyStore::new();
        let targets = Targets::new();
        let ctx = Context::new(&mut props, &targets);

        let err = Fileset::reference("nope").resolve("copy", &ctx).unwrap_err();
        assert!(matches!(
            err,
            BriskError::Task(TaskError::InvalidConfiguration { task: "copy", .. })
        ));
    }
}
