use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Required suffix of the output archive.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Root directory of all entries inside the archive.
pub const SYMBOLS_ROOT: &str = "symbols";

/// Why an archive path cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("archive path is not valid UTF-8: {0}")]
    NotUnicode(PathBuf),

    #[error("archive path must end in .zip: {0}")]
    MissingSuffix(PathBuf),

    /// The part before the suffix does not name a directory of its own
    /// (empty, `.`, `..` or a trailing separator).
    #[error("archive name must have a stem naming its work directory: {0}")]
    NoStem(PathBuf),
}

/// Paths used by one collection run, derived from the archive path.
///
/// This does *not* touch the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectLayout {
    /// Final archive location (`out.zip`).
    pub archive_path: PathBuf,
    /// Scratch directory for `.sym` files (`out`).
    pub work_dir: PathBuf,
    /// Where the archive is staged in atomic mode (`out.zip.partial`).
    pub staging_path: PathBuf,
}

impl CollectLayout {
    /// Compute the layout for `archive`.
    ///
    /// The work directory is the archive path minus `.zip`, and it is wiped
    /// before every run. Its last component must therefore be a plain name.
    pub fn from_archive(archive: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let archive = archive.as_ref();
        let Some(text) = archive.to_str() else {
            return Err(LayoutError::NotUnicode(archive.to_path_buf()));
        };
        let Some(stem) = text.strip_suffix(ARCHIVE_SUFFIX) else {
            return Err(LayoutError::MissingSuffix(archive.to_path_buf()));
        };
        let last = stem.rsplit(['/', '\\']).next().unwrap_or_default();
        if matches!(last, "" | "." | "..") {
            return Err(LayoutError::NoStem(archive.to_path_buf()));
        }
        let mut staging = OsString::from(archive.as_os_str());
        staging.push(".partial");

        Ok(Self {
            work_dir: PathBuf::from(stem),
            staging_path: PathBuf::from(staging),
            archive_path: archive.to_path_buf(),
        })
    }
}

/// Archive directory holding one module build: `symbols/<name>/<identity>`.
///
/// An empty identity is kept as-is, which yields a doubled separator further on.
pub fn module_dir_entry(file_name: &str, identity: &str) -> String {
    format!("{SYMBOLS_ROOT}/{file_name}/{identity}")
}

/// Archive path of a symbol file: `symbols/<name>/<identity>/<name>.sym`.
pub fn symbol_file_entry(file_name: &str, identity: &str) -> String {
    format!("{}/{file_name}.sym", module_dir_entry(file_name, identity))
}
