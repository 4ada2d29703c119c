//! Supported platform identifiers.
//!
//! The platform only decides how matched paths are rendered and whether
//! matching is case-insensitive by default. It never changes which directory
//! is read.

use std::fmt;
use std::str::FromStr;

use crate::error::InvalidOptionError;

pub const PLATFORM_OPTION: &str = "--platform";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Aix,
    Android,
    Darwin,
    Freebsd,
    Haiku,
    Linux,
    Openbsd,
    Sunos,
    Win32,
    Cygwin,
    Netbsd,
}

impl Platform {
    pub const ALL: [Platform; 11] = [
        Platform::Aix,
        Platform::Android,
        Platform::Darwin,
        Platform::Freebsd,
        Platform::Haiku,
        Platform::Linux,
        Platform::Openbsd,
        Platform::Sunos,
        Platform::Win32,
        Platform::Cygwin,
        Platform::Netbsd,
    ];

    /// Validates a user supplied `--platform` value.
    ///
    /// Matching is exact: `Linux` or ` linux` are rejected just like unknown
    /// names, and the error keeps the value as it was typed.
    pub fn validate(value: &str) -> Result<Self, InvalidOptionError> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or_else(|| InvalidOptionError {
                option: PLATFORM_OPTION.to_string(),
                value: value.to_string(),
            })
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Win32
        } else if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
            Platform::Darwin
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "freebsd") {
            Platform::Freebsd
        } else if cfg!(target_os = "openbsd") {
            Platform::Openbsd
        } else if cfg!(target_os = "netbsd") {
            Platform::Netbsd
        } else if cfg!(target_os = "solaris") || cfg!(target_os = "illumos") {
            Platform::Sunos
        } else if cfg!(target_os = "aix") {
            Platform::Aix
        } else if cfg!(target_os = "haiku") {
            Platform::Haiku
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Aix => "aix",
            Platform::Android => "android",
            Platform::Darwin => "darwin",
            Platform::Freebsd => "freebsd",
            Platform::Haiku => "haiku",
            Platform::Linux => "linux",
            Platform::Openbsd => "openbsd",
            Platform::Sunos => "sunos",
            Platform::Win32 => "win32",
            Platform::Cygwin => "cygwin",
            Platform::Netbsd => "netbsd",
        }
    }

    /// Separator used when rendering matched paths.
    pub fn separator(self) -> char {
        match self {
            Platform::Win32 => '\\',
            _ => '/',
        }
    }

    /// Whether matching ignores case unless told otherwise.
    pub fn default_nocase(self) -> bool {
        matches!(self, Platform::Win32 | Platform::Darwin)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = InvalidOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)
    }
}
