//! Glob expansion against the filesystem.
//!
//! Matching itself is delegated to `globset`; this module decides where to
//! start walking, which entries are visible to the glob and how a hit is
//! rendered back to the caller.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use fs_err as fs;
use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use walkdir::{DirEntry, WalkDir};

use crate::error::PatternError;
use crate::options::MatchOptions;

const MAGIC: [char; 7] = ['*', '?', '[', ']', '{', '}', '\\'];

fn has_magic(s: &str) -> bool {
    s.contains(&MAGIC[..])
}

/// Whether case-insensitive matching can change what `s` matches.
fn has_case(s: &str) -> bool {
    s.chars().any(|c| c.is_lowercase() || c.is_uppercase())
}

/// `*` never crosses a `/`, same as in a shell.
fn build_glob(pattern: &str, nocase: bool) -> Result<Glob, PatternError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .case_insensitive(nocase)
        .build()
        .map_err(|e| PatternError::new(pattern, e.kind().to_string()))
}

/// Joins path components with `/` regardless of the host separator.
///
/// `None` when a component is not valid UTF-8: such a name cannot be matched
/// or handed on without being altered.
fn to_slash(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_str()?),
            Component::ParentDir => parts.push(".."),
            _ => {}
        }
    }
    Some(parts.join("/"))
}

/// `C:` and friends, which are never looked up in a parent directory.
fn is_drive(segment: &str) -> bool {
    matches!(
        Path::new(segment).components().next(),
        Some(Component::Prefix(_))
    )
}

/// `/` joined prefix segments. An absolute prefix made only of the root
/// keeps its leading `/`.
fn join_prefix(parts: &[String]) -> String {
    let mut prefix = parts.join("/");
    if !parts.is_empty() && prefix.is_empty() {
        prefix.push('/');
    }
    prefix
}

/// Compiled `--ignore` patterns, shared by every pattern of a run.
#[derive(Debug, Default)]
pub struct IgnoreSet {
    set: Option<GlobSet>,
}

impl IgnoreSet {
    pub fn new(patterns: &[String], nocase: bool) -> Result<Self, PatternError> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(build_glob(pattern, nocase)?);
        }
        let set = builder
            .build()
            .map_err(|e| PatternError::new(patterns.join(", "), e.kind().to_string()))?;
        Ok(Self { set: Some(set) })
    }

    pub fn is_ignored(&self, candidate: &str) -> bool {
        self.set.as_ref().is_some_and(|s| s.is_match(candidate))
    }
}

/// A directory the walk starts from.
#[derive(Debug)]
struct Root {
    /// What the glob sees for `base`, `/` separated
    prefix: String,
    base: PathBuf,
}

impl Root {
    fn new(cwd: &Path, prefix: String) -> Self {
        let base = if prefix.is_empty() {
            cwd.to_path_buf()
        } else {
            cwd.join(&prefix)
        };
        Self { prefix, base }
    }

    /// The string the glob sees for a path found under `base`.
    fn candidate(&self, relative: &Path) -> Option<String> {
        let relative = to_slash(relative)?;
        Some(if self.prefix.is_empty() {
            relative
        } else if relative.is_empty() {
            self.prefix.clone()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), relative)
        })
    }
}

/// A single pattern, split into the literal directories we can jump to and
/// the glob the walked entries are checked against.
#[derive(Debug)]
struct CompiledPattern {
    source: String,
    glob: GlobMatcher,
    nocase: bool,
    magic: bool,
    dir_only: bool,
    /// Ends in `/**`, so the directory in front of it matches as well
    globstar_tail: bool,
    /// Leading literal segments
    prefix: Vec<String>,
    /// Number of named segments in `prefix`, counted towards `max_depth`
    prefix_depth: usize,
    /// Pattern segments that explicitly start with a dot
    dot_segments: Vec<GlobMatcher>,
}

impl CompiledPattern {
    fn new(pattern: &str, opts: &MatchOptions) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::new(pattern, "empty pattern"));
        }

        let dir_only = pattern.len() > 1 && pattern.ends_with('/');
        let trimmed = if dir_only {
            pattern.trim_end_matches('/')
        } else {
            pattern
        };

        let effective = if opts.match_base && !trimmed.contains('/') {
            format!("**/{trimmed}")
        } else {
            trimmed.to_string()
        };

        let nocase = opts.case_insensitive();
        let glob = build_glob(&effective, nocase)?.compile_matcher();
        let segments: Vec<&str> = effective.split('/').collect();

        // The last segment is always left to the walk, so a literal file name
        // is still checked against the glob.
        let prefix: Vec<String> = segments[..segments.len() - 1]
            .iter()
            .take_while(|s| !has_magic(s))
            .map(|s| s.to_string())
            .collect();

        let absolute =
            effective.starts_with('/') || Path::new(&join_prefix(&prefix)).is_absolute();
        let prefix_depth = if absolute {
            0
        } else {
            prefix
                .iter()
                .filter(|s| !matches!(s.as_str(), "" | "." | ".."))
                .count()
        };

        let dot_segments = segments
            .iter()
            .filter(|s| s.starts_with('.') && !matches!(**s, "." | ".."))
            .filter_map(|s| build_glob(s, nocase).ok())
            .map(|g| g.compile_matcher())
            .collect();

        Ok(Self {
            source: trimmed.to_string(),
            glob,
            nocase,
            magic: has_magic(&effective),
            dir_only,
            globstar_tail: effective.ends_with("/**"),
            prefix,
            prefix_depth,
            dot_segments,
        })
    }

    /// A pattern without wildcards that names exactly one path on disk.
    fn is_literal(&self) -> bool {
        !self.magic && !(self.nocase && has_case(&self.source))
    }

    fn is_match(&self, candidate: &str, is_dir: bool) -> bool {
        self.glob.is_match(candidate)
            || (is_dir && self.globstar_tail && self.glob.is_match(format!("{candidate}/")))
    }

    /// Directories the literal prefix names.
    ///
    /// Case-sensitive matching jumps straight to the prefix. Otherwise each
    /// segment is looked up in its parent, so `A/*.y` starts from `a` (and
    /// from `A` too, where both exist).
    fn roots(&self, cwd: &Path) -> Vec<Root> {
        if !self.nocase {
            return vec![Root::new(cwd, join_prefix(&self.prefix))];
        }

        let mut found: Vec<Vec<String>> = vec![Vec::new()];
        for segment in &self.prefix {
            if !has_case(segment) || is_drive(segment) {
                for parts in &mut found {
                    parts.push(segment.clone());
                }
                continue;
            }

            let wanted = segment.to_lowercase();
            let mut next = Vec::new();
            for parts in found {
                let dir = Root::new(cwd, join_prefix(&parts)).base;
                let entries = match fs::read_dir(&dir) {
                    Ok(entries) => entries,
                    Err(e) => {
                        log::debug!("Cannot look up '{}': {}", segment, e);
                        continue;
                    }
                };
                let mut names: Vec<String> = entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_dir())
                    .filter_map(|e| e.file_name().into_string().ok())
                    .filter(|name| name.to_lowercase() == wanted)
                    .collect();
                names.sort();
                for name in names {
                    let mut parts = parts.clone();
                    parts.push(name);
                    next.push(parts);
                }
            }
            found = next;
        }

        found
            .iter()
            .map(|parts| Root::new(cwd, join_prefix(parts)))
            .collect()
    }
}

/// Expands patterns into the paths that exist below the working directory.
#[derive(Debug)]
pub struct PathMatcher<'a> {
    opts: &'a MatchOptions,
    ignore: IgnoreSet,
}

impl<'a> PathMatcher<'a> {
    pub fn new(opts: &'a MatchOptions) -> Result<Self, PatternError> {
        let ignore = IgnoreSet::new(&opts.ignore, opts.case_insensitive())?;
        Ok(Self { opts, ignore })
    }

    pub fn options(&self) -> &MatchOptions {
        self.opts
    }

    /// Every existing path matching `pattern`, in walk order, without
    /// duplicates.
    pub fn find(&self, pattern: &str) -> Result<Vec<String>, PatternError> {
        let compiled = CompiledPattern::new(pattern, self.opts)?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut push = |rendered: Option<String>| {
            if let Some(rendered) = rendered {
                if seen.insert(rendered.clone()) {
                    out.push(rendered);
                }
            }
        };

        if compiled.is_literal() {
            let full = self.opts.cwd.join(&compiled.source);
            if fs::symlink_metadata(&full).is_ok() {
                let depth = compiled
                    .source
                    .split('/')
                    .filter(|s| !matches!(*s, "" | "."))
                    .count();
                push(self.accept(&compiled, &compiled.source, full.is_dir(), depth));
            }
            log::debug!("Literal pattern '{}' matched {:?}", pattern, out);
            return Ok(out);
        }

        // Only the last segment of a wildcard-free pattern is left to walk.
        let mut walk_depth = (!compiled.magic).then_some(1);
        if let Some(max) = self.opts.max_depth {
            let Some(remaining) = max.checked_sub(compiled.prefix_depth) else {
                return Ok(out);
            };
            walk_depth = Some(walk_depth.map_or(remaining, |d: usize| d.min(remaining)));
        }

        for root in compiled.roots(&self.opts.cwd) {
            log::debug!(
                "Expanding '{}' from {} (prefix '{}')",
                pattern,
                root.base.display(),
                root.prefix
            );
            if !root.base.exists() {
                log::debug!("Nothing to walk at {}", root.base.display());
                continue;
            }

            let mut walker = WalkDir::new(&root.base)
                .follow_links(self.opts.follow)
                .sort_by_file_name();
            if let Some(depth) = walk_depth {
                walker = walker.max_depth(depth);
            }

            for entry in walker
                .into_iter()
                .filter_entry(|e| self.visible(e, &compiled))
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        log::warn!("Skipping entry while matching '{}': {}", pattern, e);
                        continue;
                    }
                };
                let Ok(relative) = entry.path().strip_prefix(&root.base) else {
                    continue;
                };
                let Some(candidate) = root.candidate(relative) else {
                    continue;
                };
                let is_dir = entry.file_type().is_dir();
                if candidate.is_empty() || !compiled.is_match(&candidate, is_dir) {
                    continue;
                }
                let depth = compiled.prefix_depth + entry.depth();
                push(self.accept(&compiled, &candidate, is_dir, depth));
            }
        }

        log::debug!("Pattern '{}' matched {} path(s)", pattern, out.len());
        Ok(out)
    }

    /// Whether the walk enters or reports `entry` at all.
    fn visible(&self, entry: &DirEntry, compiled: &CompiledPattern) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let Some(name) = entry.file_name().to_str() else {
            log::warn!(
                "Skipping {}: file name is not valid UTF-8",
                entry.path().display()
            );
            return false;
        };
        if self.opts.dot || !name.starts_with('.') {
            return true;
        }
        compiled.dot_segments.iter().any(|g| g.is_match(name))
    }

    /// Applies the result filters and renders a hit, or drops it.
    fn accept(
        &self,
        compiled: &CompiledPattern,
        candidate: &str,
        is_dir: bool,
        depth: usize,
    ) -> Option<String> {
        if (is_dir && self.opts.nodir) || (!is_dir && compiled.dir_only) {
            return None;
        }
        if self.opts.max_depth.is_some_and(|max| depth > max) {
            return None;
        }
        if self.ignore.is_ignored(candidate) {
            return None;
        }
        self.render(candidate, is_dir)
    }

    fn render(&self, candidate: &str, is_dir: bool) -> Option<String> {
        let opts = self.opts;
        let absolute = Path::new(candidate).is_absolute() || candidate.starts_with('/');

        let mut out = if opts.absolute && !absolute {
            let Some(cwd) = opts.cwd.to_str() else {
                log::warn!(
                    "Cannot render '{}' as absolute: {} is not valid UTF-8",
                    candidate,
                    opts.cwd.display()
                );
                return None;
            };
            format!("{}/{}", cwd.trim_end_matches(&['/', '\\'][..]), candidate)
        } else if opts.dot_relative && !absolute && !candidate.starts_with("./") {
            format!("./{candidate}")
        } else {
            candidate.to_string()
        };

        if opts.mark && is_dir && !out.ends_with('/') {
            out.push('/');
        }

        let sep = opts.separator();
        if sep != '/' {
            out = out.replace('/', &sep.to_string());
        }
        Some(out)
    }
}

/// One-shot helper: compile `opts` and expand a single pattern.
pub fn match_pattern(pattern: &str, opts: &MatchOptions) -> Result<Vec<String>, PatternError> {
    PathMatcher::new(opts)?.find(pattern)
}
