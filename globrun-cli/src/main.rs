use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use globrun_core::{
    CommandTemplate, Config, DispatchMode, Dispatcher, MatchOptions, Platform, resolve,
};

mod output;

use output::{Output, OutputFormat};

/// Resolve glob patterns against the filesystem, then print the matches or
/// pass them to a command.
///
/// A pattern naming an existing file is taken literally unless `--all` is
/// given. Matches are always handed to `--cmd` as separate arguments and
/// never through a shell.
#[derive(Debug, Parser)]
#[clap(version, author, about)]
pub struct Cli {
    /// Patterns or literal paths. Defaults to `**` (or `default_patterns`
    /// from globrun.toml) when none are given
    pub patterns: Vec<String>,

    /// Additional pattern, same as a positional one. Can be repeated
    #[clap(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub extra_patterns: Vec<String>,

    /// Expand every pattern, even when it names an existing path
    #[clap(long)]
    pub all: bool,

    /// Platform whose path rules apply (aix, android, darwin, freebsd,
    /// haiku, linux, openbsd, sunos, win32, cygwin, netbsd)
    #[clap(long, value_name = "ID")]
    pub platform: Option<String>,

    /// Program to run with the matches as arguments
    #[clap(short = 'c', long = "cmd", value_name = "PROGRAM")]
    pub cmd: Option<String>,

    /// Argument passed to the program before the matches. With --each, `{}`
    /// is replaced by the match. Can be repeated
    #[clap(
        short = 'a',
        long = "arg",
        value_name = "ARG",
        allow_hyphen_values = true,
        requires = "cmd"
    )]
    pub args: Vec<String>,

    /// Run the program once per match instead of once for all of them
    #[clap(long, requires = "cmd")]
    pub each: bool,

    /// Directory to resolve patterns from
    #[clap(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Let wildcards match names starting with a dot
    #[clap(long)]
    pub dot: bool,

    /// Only report files, not directories
    #[clap(long)]
    pub nodir: bool,

    /// Append a separator to matched directories
    #[clap(long)]
    pub mark: bool,

    /// Print absolute paths
    #[clap(long, conflicts_with = "dot_relative")]
    pub absolute: bool,

    /// Prefix relative paths with `./`
    #[clap(long)]
    pub dot_relative: bool,

    /// Always print `/` separators, whatever the platform
    #[clap(long)]
    pub posix: bool,

    /// Follow symlinked directories
    #[clap(long)]
    pub follow: bool,

    /// Match case-insensitively
    #[clap(long)]
    pub nocase: bool,

    /// Match case-sensitively, even on win32 and darwin
    #[clap(long, conflicts_with = "nocase")]
    pub case_sensitive: bool,

    /// Match patterns without a `/` against file names at any depth
    #[clap(long)]
    pub match_base: bool,

    /// Do not report paths more than N segments deep
    #[clap(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Drop paths matching this pattern. Can be repeated
    #[clap(short = 'i', long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Output matches as a JSON array
    #[clap(long, conflicts_with = "cmd")]
    pub json: bool,

    /// Log resolution steps to stderr
    #[clap(long)]
    pub debug: bool,
}

fn init_logging(debug: bool) {
    if debug {
        env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
}

fn match_options(cli: &Cli, platform: Platform) -> Result<MatchOptions> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let cwd = match &cli.cwd {
        Some(dir) => current_dir.join(dir),
        None => current_dir,
    };

    let mut opts = MatchOptions::new(cwd);
    opts.platform = platform;
    opts.all = cli.all;
    opts.dot = cli.dot;
    opts.nodir = cli.nodir;
    opts.mark = cli.mark;
    opts.absolute = cli.absolute;
    opts.dot_relative = cli.dot_relative;
    opts.posix = cli.posix;
    opts.follow = cli.follow;
    opts.nocase = if cli.nocase {
        Some(true)
    } else if cli.case_sensitive {
        Some(false)
    } else {
        None
    };
    opts.match_base = cli.match_base;
    opts.max_depth = cli.max_depth;
    opts.ignore = cli.ignore.clone();
    Ok(opts)
}

fn try_main(cli: Cli, output: &Output) -> Result<i32> {
    // Before anything touches the filesystem.
    let platform = match &cli.platform {
        Some(value) => Platform::validate(value)?,
        None => Platform::current(),
    };

    let mut opts = match_options(&cli, platform)?;
    let config = match Config::find(opts.cwd()) {
        Some(config) => config?,
        None => Config::default(),
    };
    config.apply(&mut opts);
    log::debug!("Match options: {:?}", opts);

    let mut patterns = cli.patterns;
    patterns.extend(cli.extra_patterns);
    let resolved = resolve(&patterns, &config.default_patterns(), &opts)?;

    for e in resolved.errors() {
        output.error(&e.to_string());
    }
    if resolved.all_patterns_failed() {
        return Ok(1);
    }
    if resolved.is_empty() {
        output.warn("No matches found");
        return Ok(1);
    }

    match cli.cmd {
        Some(program) => {
            let mode = if cli.each {
                DispatchMode::PerPath
            } else {
                DispatchMode::Batch
            };
            let dispatcher = Dispatcher::new(CommandTemplate::new(program, cli.args), mode)
                .current_dir(opts.cwd());
            Ok(dispatcher.dispatch(&resolved)?)
        }
        None => {
            let format = if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Plain
            };
            Output::new(format).paths(resolved.paths())?;
            Ok(0)
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version go to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            ::std::process::exit(code)
        }
    };
    init_logging(cli.debug);

    let output = Output::new(OutputFormat::Plain);
    match try_main(cli, &output) {
        Ok(code) => ::std::process::exit(code),
        Err(e) => {
            output.error(&format!("{e:#}"));
            ::std::process::exit(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn positional_and_repeated_patterns() {
        let cli = Cli::parse_from(["globrun", "a", "b", "-p", "c", "-p", "d"]);
        assert_eq!(cli.patterns, ["a", "b"]);
        assert_eq!(cli.extra_patterns, ["c", "d"]);
    }

    #[test]
    fn template_args_accept_leading_hyphens() {
        let cli = Cli::parse_from(["globrun", "*.rs", "-c", "sh", "-a", "-c", "-a", "exit 1"]);
        assert_eq!(cli.cmd.as_deref(), Some("sh"));
        assert_eq!(cli.args, ["-c", "exit 1"]);
    }

    #[test]
    fn each_requires_cmd() {
        assert!(Cli::try_parse_from(["globrun", "--each"]).is_err());
    }

    #[test]
    fn nocase_and_case_sensitive_conflict() {
        assert!(Cli::try_parse_from(["globrun", "--nocase", "--case-sensitive"]).is_err());
    }

    #[test]
    fn case_flags_override_platform_default() {
        let cli = Cli::parse_from(["globrun", "--case-sensitive"]);
        let opts = match_options(&cli, Platform::Darwin).unwrap();
        assert!(!opts.case_insensitive());

        let cli = Cli::parse_from(["globrun"]);
        let opts = match_options(&cli, Platform::Darwin).unwrap();
        assert!(opts.case_insensitive());

        let cli = Cli::parse_from(["globrun", "--nocase"]);
        let opts = match_options(&cli, Platform::Linux).unwrap();
        assert!(opts.case_insensitive());
    }

    #[test]
    fn platform_is_not_validated_by_clap() {
        let cli = Cli::parse_from(["globrun", "--platform=templeos"]);
        assert_eq!(cli.platform.as_deref(), Some("templeos"));
    }
}
