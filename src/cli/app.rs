//! Main CLI application

use crate::config::{find_build_file, load_build_file};
use crate::logging::{self, Verbosity};
use crate::runner::Project;
use anyhow::{anyhow, bail, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the dotenv file loaded from the build file's directory
const DEFAULT_ENV_FILE: &str = ".env";

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("brisk")
        .version(crate::VERSION)
        .about("A declarative, target-based build tool")
        .arg(
            Arg::new("targets")
                .value_name("TARGETS")
                .help("Targets to run (defaults to the build file's default target)")
                .num_args(0..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("buildfile")
                .short('f')
                .long("buildfile")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Path to the build file (default: search for brisk.yml upwards)"),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List targets and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("define")
                .short('D')
                .value_name("NAME=VALUE")
                .help("Set a property, overriding the build file")
                .value_parser(parse_define)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("env-file")
                .short('e')
                .long("env-file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Load environment variables from a dotenv file"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print task output, warnings and errors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no log output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .value_parser(clap::value_parser!(Shell))
                .help("Print a shell completion script and exit"),
        )
}

/// Parse a `-D name=value` definition
fn parse_define(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    Verbosity::from_flags(
        matches.get_flag("silent"),
        matches.get_flag("quiet"),
        matches.get_flag("verbose"),
    )
}

/// Load the dotenv file named on the command line, or `.env` next to the build file
fn load_env_file(explicit: Option<&PathBuf>, build_file: &Path) -> Result<()> {
    let path = match explicit {
        Some(path) => path.clone(),
        None => {
            let candidate = build_file
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_ENV_FILE);
            if !candidate.is_file() {
                return Ok(());
            }
            candidate
        }
    };

    dotenvy::from_path(&path)
        .map_err(|e| anyhow!("Failed to load env file '{}': {}", path.display(), e))?;
    debug!(path = %path.display(), "loaded env file");
    Ok(())
}

/// Print visible targets and the default target
pub fn print_targets(project: &Project, out: &mut dyn Write) -> crate::Result<()> {
    let visible: Vec<_> = project.targets.visible().collect();
    let width = visible.iter().map(|t| t.name().len()).max().unwrap_or(0);

    if let Some(name) = &project.name {
        writeln!(out, "{} {}", "Project:".bold(), name)?;
    }
    writeln!(out, "{}", "Targets:".bold())?;
    for target in visible {
        let description = target.description.as_deref().unwrap_or("");
        writeln!(
            out,
            "  {:<width$}  {}",
            target.name().green(),
            description,
            width = width
        )?;
    }
    if let Some(default) = project.default_target()? {
        writeln!(out, "{} {}", "Default target:".bold(), default)?;
    }
    Ok(())
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command();
    let matches = command.clone().try_get_matches_from(args)?;

    if let Some(shell) = matches.get_one::<Shell>("completions") {
        clap_complete::generate(*shell, &mut command, "brisk", &mut io::stdout());
        return Ok(());
    }

    logging::init(get_verbosity(&matches));

    let build_file = match matches.get_one::<PathBuf>("buildfile") {
        Some(path) => {
            if !path.is_file() {
                bail!("Build file '{}' does not exist", path.display());
            }
            path.clone()
        }
        None => find_build_file()?,
    };

    load_env_file(matches.get_one::<PathBuf>("env-file"), &build_file)?;

    let overrides: Vec<(String, String)> = matches
        .get_many::<(String, String)>("define")
        .map(|defs| defs.cloned().collect())
        .unwrap_or_default();

    let mut project = load_build_file(&build_file, &overrides)
        .map_err(|e| anyhow!("Failed to load '{}': {}", build_file.display(), e))?;

    if matches.get_flag("list") {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        print_targets(&project, &mut out)?;
        return Ok(());
    }

    let targets: Vec<String> = matches
        .get_many::<String>("targets")
        .map(|names| names.cloned().collect())
        .unwrap_or_default();

    info!(build_file = %build_file.display(), "starting build");
    project.execute(&targets)?;
    info!("build successful");
    Ok(())
}
