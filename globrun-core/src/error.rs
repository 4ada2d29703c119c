//! Error types for pattern resolution and command dispatch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A pattern that could not be compiled into a glob.
///
/// Only aborts the resolution of the offending pattern; sibling patterns
/// still resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid glob pattern '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl PatternError {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// An option value outside of its accepted set.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid value provided for {option}: \"{value}\"")]
pub struct InvalidOptionError {
    pub option: String,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No patterns provided")]
    NoPatterns,

    #[error("Invalid ignore pattern: {0}")]
    Ignore(#[from] PatternError),

    #[error("Working directory {} is not accessible: {source}", path.display())]
    Cwd {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed waiting on `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
