use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no library directories are configured.
#[cfg(windows)]
pub const LIBRARY_PATH_VAR: &str = "PATH";
#[cfg(target_os = "macos")]
pub const LIBRARY_PATH_VAR: &str = "DYLD_LIBRARY_PATH";
#[cfg(not(any(windows, target_os = "macos")))]
pub const LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";

/// Ordered list of directories searched for dependency files. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self { dirs: dirs.into_iter().filter(|d| !d.as_os_str().is_empty()).collect() }
    }

    /// Split a platform list (e.g., `/a:/b`) into a search path, keeping order.
    pub fn from_list(list: &OsStr) -> Self {
        Self::new(env::split_paths(list))
    }

    /// Read the platform's dynamic-library search variable. Unset yields an empty path.
    pub fn from_env() -> Self {
        env::var_os(LIBRARY_PATH_VAR).map(|v| Self::from_list(&v)).unwrap_or_default()
    }

    /// Use `configured` when non-empty, otherwise fall back to [`SearchPath::from_env`].
    pub fn configured_or_env(configured: &[PathBuf]) -> Self {
        if configured.is_empty() {
            Self::from_env()
        } else {
            Self::new(configured.iter().cloned())
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Resolve a dependency name to `dir/name` for the first directory holding it.
    ///
    /// When no directory matches, the bare name is returned unchanged; whatever
    /// consumes it next decides whether that is fatal.
    pub fn locate(&self, name: &str) -> ResolvedLibrary {
        match self.dirs.iter().map(|dir| dir.join(name)).find(|candidate| candidate.is_file()) {
            Some(path) => {
                tracing::debug!(library = name, path = %path.display(), "located library");
                ResolvedLibrary { name: name.to_string(), path, found: true }
            }
            None => {
                tracing::warn!(library = name, "library not found in search path, using bare name");
                ResolvedLibrary { name: name.to_string(), path: PathBuf::from(name), found: false }
            }
        }
    }
}

/// A dependency name paired with the path it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    pub name: String,
    pub path: PathBuf,
    /// `false` when `path` is just the bare name.
    pub found: bool,
}

impl ResolvedLibrary {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
