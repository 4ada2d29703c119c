pub mod config;
pub mod dispatch;
pub mod error;
pub mod matcher;
pub mod options;
pub mod platform;
pub mod resolve;

pub use config::{CONFIG_FILE_NAME, Config, find_config_file};
pub use dispatch::{CommandTemplate, DispatchMode, Dispatcher};
pub use error::{ConfigError, DispatchError, InvalidOptionError, PatternError, ResolveError};
pub use matcher::{PathMatcher, match_pattern};
pub use options::MatchOptions;
pub use platform::Platform;
pub use resolve::{DEFAULT_PATTERNS, ResolvedList, resolve};

#[cfg(test)]
pub mod testutil {
    use fs_err as fs;
    use std::path::{Path, PathBuf};

    /// Creates a file with the given content at the specified path.
    /// Creates parent directories if needed.
    /// Returns the full path to the created file.
    pub fn create_file(dir: &Path, relative_path: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn create_dir(dir: &Path, relative_path: &str) -> PathBuf {
        let path = dir.join(relative_path);
        fs::create_dir_all(&path).unwrap();
        path
    }
}
