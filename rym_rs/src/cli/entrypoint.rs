//! Shared launcher body for task runner binaries.
//!
//! Root options come from three places, later ones winning: `rym.toml`, the
//! task definition file (`Rymfile`) and the command line. Whatever the root
//! parser does not recognise is handed to the [`Dispatcher`].

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use super::dispatch::{Dispatcher, HELP_TOKEN, Resolution};
use super::helpers::parse_color_mode;
use super::options::{OptionSet, OptionSpec, ParsedOptions};
use crate::config::{CONFIG_FILE, ConfigError, RymConfig};
use crate::interrupt::InterruptWatcher;
use crate::task::{LoadRequest, ModuleLoader};
use crate::{logging, output, procfile};

/// Options controlling binary-specific behavior.
pub struct EntryOptions<'a> {
    /// Program name used in help, messages and `--version`.
    pub binary_name: &'static str,
    /// Version shown by `--version`.
    pub version: &'static str,
    /// Printed above the help text.
    pub about: Option<&'static str>,
    /// Supplies the task types.
    pub loader: &'a dyn ModuleLoader,
}

/// Options understood by the launcher itself.
pub fn root_options() -> OptionSet {
    OptionSet::new()
        .with(OptionSpec::switch("debug", "Print diagnostic messages"))
        .with(OptionSpec::switch(
            "trace",
            "Print trace messages and full error reports",
        ))
        .with(OptionSpec::switch("h|help", "Show this help"))
        .with(OptionSpec::switch("version", "Show version information"))
        .with(OptionSpec::required(
            "f|procfile",
            "path",
            format!("Task definition file (default: {})", procfile::DEFAULT_PROCFILE),
        ))
        .with(OptionSpec::required(
            "work-dir",
            "path",
            "Directory the task runs in",
        ))
        .with(OptionSpec::required(
            "type-filter",
            "regex",
            "Only load task types whose name matches",
        ))
        .with(OptionSpec::required(
            "color",
            "mode",
            "auto, always or never (default: auto)",
        ))
        .with(OptionSpec::required(
            "default-operation",
            "name",
            "Operation run when only a task is named (default: execute)",
        ))
}

/// Root option values after merging all sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootArgs {
    pub debug: bool,
    pub trace: bool,
    pub help: bool,
    pub version: bool,
    pub procfile: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
    pub type_filter: Option<String>,
    pub color: Option<String>,
    pub default_operation: Option<String>,
    /// Tokens for the dispatcher.
    pub rest: Vec<String>,
}

impl From<ParsedOptions> for RootArgs {
    fn from(parsed: ParsedOptions) -> Self {
        let text = |name: &str| parsed.last(name).map(str::to_string);
        Self {
            debug: parsed.is_set("debug"),
            trace: parsed.is_set("trace"),
            help: parsed.is_set("help"),
            version: parsed.is_set("version"),
            procfile: text("procfile").map(PathBuf::from),
            work_dir: text("work-dir").map(PathBuf::from),
            type_filter: text("type-filter"),
            color: text("color"),
            default_operation: text("default-operation"),
            rest: parsed.residue.clone(),
        }
    }
}

/// Parse the command line, merging in the task definition file.
///
/// Returns the merged arguments plus warnings to log once the subscriber
/// is up.
pub fn parse_root_args(
    root: &OptionSet,
    raw_args: &[String],
    config: &RymConfig,
) -> Result<(RootArgs, Vec<String>)> {
    let cli = root
        .parse(raw_args.iter().cloned())
        .context("Invalid launcher option")?;
    let procfile_path = cli
        .last("procfile")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.procfile.clone());

    let Some(file_tokens) = procfile::load(&procfile_path)? else {
        return Ok((RootArgs::from(cli), Vec::new()));
    };

    let from_file = root
        .parse(file_tokens)
        .with_context(|| format!("Invalid option in {}", procfile_path.display()))?;
    let mut warnings = Vec::new();
    for ignored in &from_file.residue {
        warnings.push(format!(
            "ignoring unknown line '{}' in {}",
            ignored.trim_start_matches('-'),
            procfile_path.display()
        ));
    }

    let mut matches = from_file.matches;
    matches.extend(cli.matches);
    let merged = ParsedOptions {
        matches,
        residue: cli.residue,
    };
    Ok((RootArgs::from(merged), warnings))
}

/// Run the launcher on the process arguments.
pub fn run(opts: &EntryOptions<'_>) -> ExitCode {
    let raw_args: Vec<String> = env::args().skip(1).collect();
    run_with_args(opts, raw_args)
}

/// Run the launcher on `raw_args` (without the program name).
pub fn run_with_args(opts: &EntryOptions<'_>, raw_args: Vec<String>) -> ExitCode {
    let mut trace = false;
    match launch(opts, &raw_args, &mut trace) {
        Ok(code) => code,
        Err(err) => {
            output::error(&err, trace);
            ExitCode::FAILURE
        }
    }
}

fn launch(opts: &EntryOptions<'_>, raw_args: &[String], trace: &mut bool) -> Result<ExitCode> {
    let root = root_options();
    let cwd = env::current_dir().context("Cannot determine the working directory")?;

    let (config, config_error) = match RymConfig::try_load_from_path(&cwd.join(CONFIG_FILE)) {
        Ok(config) => (config, None),
        Err(e) => (RymConfig::default(), Some(e)),
    };
    let (args, warnings) = parse_root_args(&root, raw_args, &config)?;
    *trace = args.trace;

    logging::init(args.debug, args.trace);
    if let Some(e) = config_error {
        warn!("{}, using defaults", e);
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    let color = args.color.as_deref().unwrap_or("auto");
    parse_color_mode(color).map_err(ConfigError::Color)?.apply();

    if args.version {
        println!("{} {}", opts.binary_name, opts.version);
        return Ok(ExitCode::SUCCESS);
    }

    let type_filter = args
        .type_filter
        .clone()
        .or_else(|| config.type_filter.clone())
        .map(|pattern| {
            Regex::new(&pattern).map_err(|source| ConfigError::TypeFilter { pattern, source })
        })
        .transpose()?;
    let types = opts
        .loader
        .load(&LoadRequest { type_filter })
        .context("Failed to load task modules")?;

    let mut dispatch_config = config.dispatch_config(opts.binary_name);
    if let Some(name) = &args.default_operation {
        dispatch_config.default_operation = Some(name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
    }
    let dispatcher =
        Dispatcher::new(&types, dispatch_config, &root).with_verbosity(args.debug, args.trace);

    let mut tokens = args.rest.clone();
    if args.help {
        tokens.insert(0, HELP_TOKEN.to_string());
    }

    match dispatcher.dispatch(&tokens)? {
        Resolution::HelpRequested(request) => {
            if request.target.is_none()
                && let Some(about) = opts.about
            {
                println!("{}\n", about);
            }
            print!("{}", request.text);
            Ok(ExitCode::SUCCESS)
        }
        Resolution::NotFound(not_found) => {
            println!("{}", not_found);
            Ok(ExitCode::SUCCESS)
        }
        Resolution::BindingFailed(failure) => {
            println!("{}", failure);
            Ok(ExitCode::SUCCESS)
        }
        Resolution::Runnable(action) => {
            let work_dir = args.work_dir.clone().or_else(|| config.work_dir.clone());
            let watcher = InterruptWatcher::spawn(action.cancellation())
                .context("Cannot install the interrupt handler")?;
            let outcome = {
                let _work_dir = work_dir.as_deref().map(WorkDirGuard::enter).transpose()?;
                action.run()
            };
            watcher.finish();
            outcome?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Switches the process working directory and restores it on drop.
struct WorkDirGuard {
    origin: PathBuf,
}

impl WorkDirGuard {
    fn enter(dir: &Path) -> Result<Self> {
        let origin = env::current_dir().context("Cannot determine the working directory")?;
        env::set_current_dir(dir)
            .with_context(|| format!("Cannot enter work dir {}", dir.display()))?;
        debug!(dir = %dir.display(), "entered work dir");
        Ok(Self { origin })
    }
}

impl Drop for WorkDirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.origin) {
            warn!("Cannot restore working directory {}: {}", self.origin.display(), e);
        }
    }
}
