//! Zip output for collected symbol files.
//!
//! Entries are appended in call order and never rewritten. For every module,
//! callers add the `symbols/<name>/<identity>` directory followed by the
//! symbol file itself.

pub mod layout;

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub use layout::{
    module_dir_entry, symbol_file_entry, CollectLayout, LayoutError,
    ARCHIVE_SUFFIX,
};

/// Error type for archive operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("zip error on {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Kind of an entry written to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Write-once symbol archive.
pub struct SymbolArchive {
    path: PathBuf,
    writer: Option<ZipWriter<File>>,
    options: SimpleFileOptions,
    entries: Vec<(EntryKind, String)>,
    names: HashSet<String>,
}

impl SymbolArchive {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .map_err(|source| ArchiveError::Io { action: "create", path: path.clone(), source })?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        Ok(Self {
            path,
            writer: Some(ZipWriter::new(file)),
            options,
            entries: Vec::new(),
            names: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries written so far, in archive order. Directory names carry no trailing slash.
    pub fn entries(&self) -> &[(EntryKind, String)] {
        &self.entries
    }

    /// Register a directory entry. Adding the same directory twice is a no-op.
    pub fn add_directory(&mut self, name: &str) -> Result<(), ArchiveError> {
        let key = format!("{}/", name.trim_end_matches('/'));
        if self.names.contains(&key) {
            return Ok(());
        }
        let options = self.options.unix_permissions(0o755);
        let path = self.path.clone();
        self.writer_mut()?
            .add_directory(key.as_str(), options)
            .map_err(|source| ArchiveError::Zip { path, source })?;
        self.entries.push((EntryKind::Directory, key.trim_end_matches('/').to_string()));
        self.names.insert(key);
        Ok(())
    }

    /// Stream `source` into the archive under `name`.
    ///
    /// Returns `false` without writing anything if an entry called `name`
    /// already exists.
    pub fn add_file(&mut self, name: &str, source: &Path) -> Result<bool, ArchiveError> {
        if self.names.contains(name) {
            tracing::warn!(entry = name, "archive entry already present, not overwriting");
            return Ok(false);
        }
        let mut input = File::open(source).map_err(|e| ArchiveError::Io {
            action: "open",
            path: source.to_path_buf(),
            source: e,
        })?;

        let options = self.options;
        let path = self.path.clone();
        let writer = self.writer_mut()?;
        writer
            .start_file(name, options)
            .map_err(|source| ArchiveError::Zip { path: path.clone(), source })?;
        io::copy(&mut input, writer)
            .map_err(|source| ArchiveError::Io { action: "write", path, source })?;

        self.entries.push((EntryKind::File, name.to_string()));
        self.names.insert(name.to_string());
        Ok(true)
    }

    /// Write the central directory and close the file. Further calls are no-ops.
    pub fn finish(&mut self) -> Result<(), ArchiveError> {
        if let Some(writer) = self.writer.take() {
            writer
                .finish()
                .map_err(|source| ArchiveError::Zip { path: self.path.clone(), source })?;
        }
        Ok(())
    }

    fn writer_mut(&mut self) -> Result<&mut ZipWriter<File>, ArchiveError> {
        let path = &self.path;
        self.writer.as_mut().ok_or_else(|| ArchiveError::Io {
            action: "append to",
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::Other, "archive already finished"),
        })
    }
}
