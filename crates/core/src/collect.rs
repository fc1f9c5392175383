//! The collection pipeline.
//!
//! `Collector::collect` symbolizes the target, asks the resolver for its
//! first-level dependencies, then locates and symbolizes each of them in
//! discovery order. Every symbol file lands in the archive under
//! `symbols/<name>/<identity>/<name>.sym`. The first failure stops the run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::archive::{
    module_dir_entry, symbol_file_entry, ArchiveError, CollectLayout, SymbolArchive,
};
use crate::config::CollectConfig;
use crate::deps::{dedup_dependencies, DependencyResolver, InspectorKind, ToolResolver};
use crate::locate::SearchPath;
use crate::process::ToolError;
use crate::symbols::{module_file_name, read_module_identity, SymbolDumper};
use crate::util::sha256_file;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Invalid input detected before anything runs.
    #[error("{0}")]
    Usage(String),

    #[error("could not create work directory {path}: {source}")]
    WorkDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// An external tool failed while processing `module`.
    #[error("{module}: {source}")]
    Tool {
        module: String,
        #[source]
        source: ToolError,
    },

    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One symbolized binary as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedModule {
    pub file_name: String,
    pub source_path: PathBuf,
    /// May be empty when the symbol file had no `MODULE` record.
    pub identity: String,
    pub dir_entry: String,
    pub entry_path: String,
    pub symbol_file: PathBuf,
    pub sha256: String,
    /// `false` if an identical entry was already in the archive.
    pub packaged: bool,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectReport {
    pub target: PathBuf,
    pub archive: PathBuf,
    pub work_dir: PathBuf,
    pub started_at: String,
    pub finished_at: String,
    /// Dependency names as reported, after duplicate removal.
    pub dependencies: Vec<String>,
    /// Target first, then dependencies in discovery order.
    pub modules: Vec<CollectedModule>,
}

/// Drives the pipeline for one target.
pub struct Collector {
    pub dumper: SymbolDumper,
    pub resolver: Box<dyn DependencyResolver>,
    pub search_path: SearchPath,
    /// Stage the archive next to its destination and rename on success.
    pub atomic: bool,
}

impl Collector {
    pub fn new(
        dumper: SymbolDumper,
        resolver: Box<dyn DependencyResolver>,
        search_path: SearchPath,
    ) -> Self {
        Self { dumper, resolver, search_path, atomic: false }
    }

    /// Build a collector from resolved settings.
    pub fn from_config(config: &CollectConfig) -> Result<Self, CollectError> {
        let dumper =
            SymbolDumper::new(config.resolved_dump_syms(), config.dump_syms_args.clone());
        let resolver = build_resolver(config)?;
        let search_path = SearchPath::configured_or_env(&config.library_path);
        Ok(Self { dumper, resolver, search_path, atomic: config.atomic })
    }

    /// Collect symbols for `target` and its dependencies into `archive`.
    pub fn collect(&self, target: &Path, archive: &Path) -> Result<CollectReport, CollectError> {
        let started_at = Utc::now().to_rfc3339();
        let layout =
            CollectLayout::from_archive(archive).map_err(|e| CollectError::Usage(e.to_string()))?;

        recreate_dir(&layout.work_dir)?;

        let output_path =
            if self.atomic { layout.staging_path.clone() } else { layout.archive_path.clone() };
        let mut zip = SymbolArchive::create(&output_path)?;

        let result = self.run(target, &layout, &mut zip);
        let finished = zip.finish();

        let (dependencies, modules) = match (result, finished) {
            (Ok(done), Ok(())) => done,
            (Err(e), finished) => {
                if let Err(close) = finished {
                    tracing::warn!(error = %close, "could not finalize partial archive");
                }
                self.discard_staging(&layout);
                return Err(e);
            }
            (Ok(_), Err(e)) => {
                self.discard_staging(&layout);
                return Err(e.into());
            }
        };

        if self.atomic {
            fs::rename(&layout.staging_path, &layout.archive_path).map_err(|source| {
                CollectError::Io {
                    action: "move archive into place at",
                    path: layout.archive_path.clone(),
                    source,
                }
            })?;
        }

        tracing::info!(
            archive = %layout.archive_path.display(),
            modules = modules.len(),
            "symbol archive written"
        );

        Ok(CollectReport {
            target: target.to_path_buf(),
            archive: layout.archive_path,
            work_dir: layout.work_dir,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            dependencies,
            modules,
        })
    }

    fn run(
        &self,
        target: &Path,
        layout: &CollectLayout,
        zip: &mut SymbolArchive,
    ) -> Result<(Vec<String>, Vec<CollectedModule>), CollectError> {
        let mut modules = vec![self.collect_module(target, layout, zip)?];
        tracing::info!(target = %target.display(), "target symbolized");

        let dependencies = self.resolver.dependencies(target).map_err(|source| {
            CollectError::Tool { module: target.display().to_string(), source }
        })?;
        let dependencies = dedup_dependencies(dependencies);
        tracing::info!(
            count = dependencies.len(),
            resolver = self.resolver.name(),
            "dependencies discovered"
        );

        for name in &dependencies {
            let library = self.search_path.locate(name);
            modules.push(self.collect_module(library.path(), layout, zip)?);
        }

        Ok((dependencies, modules))
    }

    /// Dump, identify and package one binary.
    fn collect_module(
        &self,
        binary: &Path,
        layout: &CollectLayout,
        zip: &mut SymbolArchive,
    ) -> Result<CollectedModule, CollectError> {
        let module = binary.display().to_string();
        let symbol_file = self
            .dumper
            .dump(binary, &layout.work_dir)
            .map_err(|source| CollectError::Tool { module: module.clone(), source })?;

        let file_name = module_file_name(binary);
        let identity = read_module_identity(&symbol_file);
        let dir_entry = module_dir_entry(&file_name, &identity);
        let entry_path = symbol_file_entry(&file_name, &identity);

        let sha256 = sha256_file(&symbol_file).map_err(|source| CollectError::Io {
            action: "read symbol file",
            path: symbol_file.clone(),
            source,
        })?;

        zip.add_directory(&dir_entry)?;
        let packaged = zip.add_file(&entry_path, &symbol_file)?;
        tracing::debug!(module = %module, entry = %entry_path, "packaged symbol file");

        Ok(CollectedModule {
            file_name,
            source_path: binary.to_path_buf(),
            identity,
            dir_entry,
            entry_path,
            symbol_file,
            sha256,
            packaged,
        })
    }

    fn discard_staging(&self, layout: &CollectLayout) {
        if self.atomic {
            if let Err(e) = fs::remove_file(&layout.staging_path) {
                tracing::warn!(
                    path = %layout.staging_path.display(),
                    error = %e,
                    "could not remove staged archive"
                );
            }
        }
    }
}

/// Pick the dependency resolver named by the config.
pub fn build_resolver(config: &CollectConfig) -> Result<Box<dyn DependencyResolver>, CollectError> {
    match config.inspector.kind {
        InspectorKind::Objdump | InspectorKind::Readelf => Ok(Box::new(ToolResolver::new(
            config.inspector.kind,
            config.inspector.resolved_program(),
        ))),
        #[cfg(feature = "native-resolver")]
        InspectorKind::Native => Ok(Box::new(crate::deps::NativeResolver)),
        #[cfg(not(feature = "native-resolver"))]
        InspectorKind::Native => Err(CollectError::Usage(
            "native dependency inspection requires the `native-resolver` feature".to_string(),
        )),
    }
}

/// Remove `dir` if present and create it again, empty.
fn recreate_dir(dir: &Path) -> Result<(), CollectError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(CollectError::WorkDir { path: dir.to_path_buf(), source }),
    }
    fs::create_dir_all(dir)
        .map_err(|source| CollectError::WorkDir { path: dir.to_path_buf(), source })
}
