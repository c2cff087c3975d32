//! Permission and ownership tasks: chmod, chown, chgrp

use crate::error::Result;
use crate::runner::{Context, Task};
use crate::tasks::{os_call, selected_paths, Fileset};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Sets permission bits from an octal mode such as `755` or `0o644`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChmodTask {
    pub file: Option<String>,
    pub fileset: Option<Fileset>,

    #[serde(deserialize_with = "crate::config::types::opt_scalar")]
    pub mode: Option<String>,
}

impl ChmodTask {
    pub fn new(file: impl Into<String>, mode: impl Into<String>) -> Self {
        ChmodTask {
            file: Some(file.into()),
            mode: Some(mode.into()),
            fileset: None,
        }
    }
}

/// Parse an octal permission mode
pub fn parse_mode(mode: &str) -> Option<u32> {
    let digits = mode.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    u32::from_str_radix(digits, 8).ok()
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    // only the write bits map to anything here
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions)
}

impl Task for ChmodTask {
    fn kind(&self) -> &'static str {
        "chmod"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let raw = ctx.require("chmod", "mode", self.mode.as_ref())?;
        let mode = parse_mode(&raw)
            .ok_or_else(|| ctx.invalid("chmod", format!("'{}' is not an octal mode", raw)))?;

        let paths = selected_paths("chmod", "file", self.file.as_ref(), self.fileset.as_ref(), ctx)?;
        for path in paths {
            os_call("chmod", "change mode of", &path, || set_mode(&path, mode))?;
        }
        Ok(())
    }
}

/// Changes the owner (and optionally the group) of files
///
/// `user` accepts `name`, `name:group` or `name.group`; numeric ids work too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChownTask {
    pub file: Option<String>,
    pub fileset: Option<Fileset>,

    #[serde(deserialize_with = "crate::config::types::opt_scalar")]
    pub user: Option<String>,
}

impl ChownTask {
    pub fn new(file: impl Into<String>, user: impl Into<String>) -> Self {
        ChownTask {
            file: Some(file.into()),
            user: Some(user.into()),
            fileset: None,
        }
    }
}

/// Split an owner spec into user and optional group
pub fn split_owner(spec: &str) -> (&str, Option<&str>) {
    match spec.split_once([':', '.']) {
        Some((user, group)) if !group.is_empty() => (user, Some(group)),
        Some((user, _)) => (user, None),
        None => (spec, None),
    }
}

impl Task for ChownTask {
    fn kind(&self) -> &'static str {
        "chown"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let spec = ctx.require("chown", "user", self.user.as_ref())?;
        let (user, group) = split_owner(&spec);
        let owner = owner::Owner::lookup(Some(user), group)
            .map_err(|message| ctx.invalid("chown", message))?;

        let paths = selected_paths("chown", "file", self.file.as_ref(), self.fileset.as_ref(), ctx)?;
        for path in paths {
            os_call("chown", "change owner of", &path, || owner.apply(&path))?;
        }
        Ok(())
    }
}

/// Changes the group of files
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChgrpTask {
    pub file: Option<String>,
    pub fileset: Option<Fileset>,

    #[serde(deserialize_with = "crate::config::types::opt_scalar")]
    pub group: Option<String>,
}

impl ChgrpTask {
    pub fn new(file: impl Into<String>, group: impl Into<String>) -> Self {
        ChgrpTask {
            file: Some(file.into()),
            group: Some(group.into()),
            fileset: None,
        }
    }
}

impl Task for ChgrpTask {
    fn kind(&self) -> &'static str {
        "chgrp"
    }

    fn execute(&self, ctx: &mut Context<'_>) -> Result<()> {
        let group = ctx.require("chgrp", "group", self.group.as_ref())?;
        let owner = owner::Owner::lookup(None, Some(&group))
            .map_err(|message| ctx.invalid("chgrp", message))?;

        let paths = selected_paths("chgrp", "file", self.file.as_ref(), self.fileset.as_ref(), ctx)?;
        for path in paths {
            os_call("chgrp", "change group of", &path, || owner.apply(&path))?;
        }
        Ok(())
    }
}

#[cfg(unix)]
mod owner {
    use nix::unistd::{chown, Gid, Group, Uid, User};
    use std::io;
    use std::path::Path;

    /// Resolved numeric owner and group
    #[derive(Debug, Clone, Copy)]
    pub struct Owner {
        uid: Option<Uid>,
        gid: Option<Gid>,
    }

    impl Owner {
        pub fn lookup(user: Option<&str>, group: Option<&str>) -> Result<Self, String> {
            let uid = user.map(resolve_user).transpose()?;
            let gid = group.map(resolve_group).transpose()?;
            Ok(Owner { uid, gid })
        }

        pub fn apply(&self, path: &Path) -> io::Result<()> {
            chown(path, self.uid, self.gid).map_err(io::Error::from)
        }
    }

    fn resolve_user(name: &str) -> Result<Uid, String> {
        if let Ok(id) = name.parse::<u32>() {
            return Ok(Uid::from_raw(id));
        }
        match User::from_name(name) {
            Ok(Some(user)) => Ok(user.uid),
            Ok(None) => Err(format!("unknown user '{}'", name)),
            Err(errno) => Err(format!("failed to look up user '{}': {}", name, errno)),
        }
    }

    fn resolve_group(name: &str) -> Result<Gid, String> {
        if let Ok(id) = name.parse::<u32>() {
            return Ok(Gid::from_raw(id));
        }
        match Group::from_name(name) {
            Ok(Some(group)) => Ok(group.gid),
            Ok(None) => Err(format!("unknown group '{}'", name)),
            Err(errno) => Err(format!("failed to look up group '{}': {}", name, errno)),
        }
    }
}

#[cfg(not(unix))]
mod owner {
    use std::io;
    use std::path::Path;

    #[derive(Debug, Clone, Copy)]
    pub struct Owner;

    impl Owner {
        pub fn lookup(_user: Option<&str>, _group: Option<&str>) -> Result<Self, String> {
            Err("changing file ownership is only supported on unix".to_string())
        }

        pub fn apply(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }
    }
}
