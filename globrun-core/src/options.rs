use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// Everything that shapes how a pattern is matched and rendered.
///
/// Built once per run and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// Directory patterns are resolved against
    pub cwd: PathBuf,
    pub platform: Platform,
    /// Expand every pattern, even ones naming an existing path
    pub all: bool,
    /// Let wildcards match segments starting with `.`
    pub dot: bool,
    /// Drop directories from the results
    pub nodir: bool,
    /// Append a separator to matched directories
    pub mark: bool,
    /// Render absolute paths instead of cwd-relative ones
    pub absolute: bool,
    /// Prefix relative results with `./`
    pub dot_relative: bool,
    /// Always render with `/`, whatever the platform
    pub posix: bool,
    /// Follow symlinked directories while walking
    pub follow: bool,
    /// Case-insensitive matching. `None` means the platform default.
    pub nocase: Option<bool>,
    /// Match slash-less patterns against the file name at any depth
    pub match_base: bool,
    /// Maximum number of path segments below `cwd`
    pub max_depth: Option<usize>,
    /// Paths matching any of these are dropped
    pub ignore: Vec<String>,
}

impl MatchOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            platform: Platform::current(),
            all: false,
            dot: false,
            nodir: false,
            mark: false,
            absolute: false,
            dot_relative: false,
            posix: false,
            follow: false,
            nocase: None,
            match_base: false,
            max_depth: None,
            ignore: Vec::new(),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn case_insensitive(&self) -> bool {
        self.nocase.unwrap_or_else(|| self.platform.default_nocase())
    }

    /// Separator used when rendering results.
    pub fn separator(&self) -> char {
        if self.posix {
            '/'
        } else {
            self.platform.separator()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nocase_follows_platform_unless_overridden() {
        let mut opts = MatchOptions::new(".");
        opts.platform = Platform::Win32;
        assert!(opts.case_insensitive());

        opts.nocase = Some(false);
        assert!(!opts.case_insensitive());
    }

    #[test]
    fn posix_forces_forward_slash() {
        let mut opts = MatchOptions::new(".");
        opts.platform = Platform::Win32;
        assert_eq!(opts.separator(), '\\');

        opts.posix = true;
        assert_eq!(opts.separator(), '/');
    }
}
