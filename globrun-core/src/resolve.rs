//! Turns the caller's patterns into the final, ordered list of paths.

use std::path::Path;

use fs_err as fs;

use crate::error::{PatternError, ResolveError};
use crate::matcher::PathMatcher;
use crate::options::MatchOptions;

/// Patterns used when neither the command line nor `globrun.toml` gives any.
pub const DEFAULT_PATTERNS: &[&str] = &["**"];

/// The concatenated matches of every pattern, in input order.
///
/// Patterns are not deduplicated against each other: two overlapping
/// patterns report the shared path twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedList {
    paths: Vec<String>,
    errors: Vec<PatternError>,
    patterns: usize,
}

impl ResolvedList {
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }

    /// Patterns that failed to compile, in input order.
    pub fn errors(&self) -> &[PatternError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// The no-matches condition. Not an error by itself.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// True when there was at least one pattern and none of them compiled.
    pub fn all_patterns_failed(&self) -> bool {
        self.patterns > 0 && self.errors.len() == self.patterns
    }
}

impl From<Vec<String>> for ResolvedList {
    fn from(paths: Vec<String>) -> Self {
        Self {
            paths,
            errors: Vec::new(),
            patterns: 0,
        }
    }
}

/// An existing file or directory named exactly like the pattern.
fn exists_literally(cwd: &Path, pattern: &str) -> bool {
    !pattern.is_empty() && fs::symlink_metadata(cwd.join(pattern)).is_ok()
}

/// An exact match as typed, with `/` swapped for the output separator.
fn native_separators(pattern: &str, sep: char) -> String {
    if sep == '/' {
        pattern.to_string()
    } else {
        pattern.replace('/', &sep.to_string())
    }
}

/// Resolves `patterns` (or `defaults` when there are none) against
/// `opts.cwd`.
///
/// Unless `opts.all` is set, a pattern naming an existing path is returned
/// verbatim and never expanded, so `routes/[id].tsx` stays a single file
/// instead of turning into a character class.
pub fn resolve(
    patterns: &[String],
    defaults: &[String],
    opts: &MatchOptions,
) -> Result<ResolvedList, ResolveError> {
    let patterns = if patterns.is_empty() {
        log::debug!("No patterns given, using defaults {:?}", defaults);
        defaults
    } else {
        patterns
    };
    if patterns.is_empty() {
        return Err(ResolveError::NoPatterns);
    }

    let meta = fs::metadata(&opts.cwd).map_err(|source| ResolveError::Cwd {
        path: opts.cwd.clone(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ResolveError::Cwd {
            path: opts.cwd.clone(),
            source: std::io::Error::other("not a directory"),
        });
    }

    let matcher = PathMatcher::new(opts)?;
    let mut resolved = ResolvedList {
        patterns: patterns.len(),
        ..Default::default()
    };

    for pattern in patterns {
        if !opts.all && exists_literally(&opts.cwd, pattern) {
            log::debug!("'{}' exists on disk, not expanding it", pattern);
            resolved.paths.push(native_separators(pattern, opts.separator()));
            continue;
        }

        match matcher.find(pattern) {
            Ok(matches) => resolved.paths.extend(matches),
            Err(e) => {
                log::warn!("{}", e);
                resolved.errors.push(e);
            }
        }
    }

    log::debug!(
        "Resolved {} pattern(s) to {} path(s)",
        patterns.len(),
        resolved.len()
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::testutil::create_file;
    use tempfile::TempDir;

    fn routes_tree() -> (TempDir, MatchOptions) {
        let tmp = tempfile::tempdir().unwrap();
        for file in ["routes/[id].tsx", "routes/i.tsx", "routes/d.tsx"] {
            create_file(tmp.path(), file, b"");
        }
        let mut opts = MatchOptions::new(tmp.path());
        opts.platform = Platform::Linux;
        (tmp, opts)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_takes_priority() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(&strings(&["routes/[id].tsx"]), &[], &opts).unwrap();
        assert_eq!(result.paths(), ["routes/[id].tsx"]);
    }

    #[test]
    fn all_expands_existing_paths() {
        let (_tmp, mut opts) = routes_tree();
        opts.all = true;
        let result = resolve(&strings(&["routes/[id].tsx"]), &[], &opts).unwrap();
        assert_eq!(result.paths(), ["routes/d.tsx", "routes/i.tsx"]);
    }

    #[test]
    fn exact_match_uses_output_separator() {
        let (_tmp, mut opts) = routes_tree();
        opts.platform = Platform::Win32;
        let result = resolve(&strings(&["routes/[id].tsx"]), &[], &opts).unwrap();
        assert_eq!(result.paths(), ["routes\\[id].tsx"]);

        opts.all = true;
        let result = resolve(&strings(&["routes/d.tsx"]), &[], &opts).unwrap();
        assert_eq!(result.paths(), ["routes\\d.tsx"]);
    }

    #[test]
    fn patterns_concatenate_in_input_order() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(
            &strings(&["routes/i*", "routes/d*", "routes/i*"]),
            &[],
            &opts,
        )
        .unwrap();
        assert_eq!(
            result.paths(),
            ["routes/i.tsx", "routes/d.tsx", "routes/i.tsx"]
        );
    }

    #[test]
    fn defaults_used_without_patterns() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(&[], &strings(&["routes/*.tsx"]), &opts).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn no_patterns_and_no_defaults() {
        let (_tmp, opts) = routes_tree();
        let err = resolve(&[], &[], &opts).unwrap_err();
        assert!(matches!(err, ResolveError::NoPatterns));
    }

    #[test]
    fn bad_pattern_does_not_block_siblings() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(&strings(&["routes/{", "routes/d*"]), &[], &opts).unwrap();
        assert_eq!(result.paths(), ["routes/d.tsx"]);
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].pattern, "routes/{");
        assert!(!result.all_patterns_failed());
    }

    #[test]
    fn every_pattern_failing_is_flagged() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(&strings(&["routes/{"]), &[], &opts).unwrap();
        assert!(result.is_empty());
        assert!(result.all_patterns_failed());
    }

    #[test]
    fn no_matches_is_not_an_error() {
        let (_tmp, opts) = routes_tree();
        let result = resolve(&strings(&["*.rs"]), &[], &opts).unwrap();
        assert!(result.is_empty());
        assert!(result.errors().is_empty());
    }

    #[test]
    fn missing_cwd_is_an_error() {
        let (tmp, _) = routes_tree();
        let opts = MatchOptions::new(tmp.path().join("gone"));
        let err = resolve(&strings(&["*"]), &[], &opts).unwrap_err();
        assert!(matches!(err, ResolveError::Cwd { .. }));
    }
}
