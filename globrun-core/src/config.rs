use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::options::MatchOptions;
use crate::resolve::DEFAULT_PATTERNS;

pub const CONFIG_FILE_NAME: &str = "globrun.toml";

/// Project level settings read from `globrun.toml`.
///
/// Everything is optional; command line flags are applied on top.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Patterns used when none are given on the command line.
    /// An explicit empty list disables the built-in `**`.
    default_patterns: Option<Vec<String>>,
    ignore: Vec<String>,
    dot: bool,
    follow: bool,
}

/// Walks up from `start_dir` until a `globrun.toml` is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut dir = start_dir.as_ref();
    log::debug!("Searching for {} starting from {}", CONFIG_FILE_NAME, dir.display());

    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            log::debug!("Found config at {}", candidate.display());
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Config from the nearest `globrun.toml`, or `None` when there is none.
    pub fn find(current_directory: impl AsRef<Path>) -> Option<Result<Self, ConfigError>> {
        let path = find_config_file(current_directory)?;
        Some(Self::load(path))
    }

    pub fn default_patterns(&self) -> Vec<String> {
        match &self.default_patterns {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Merges file settings into options built from the command line.
    /// Flags can only be switched on here, and ignore patterns accumulate.
    pub fn apply(&self, opts: &mut MatchOptions) {
        opts.dot |= self.dot;
        opts.follow |= self.follow;
        opts.ignore.extend(self.ignore.iter().cloned());
    }
}
