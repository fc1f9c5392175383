use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::deps::InspectorKind;
use crate::symbols::{default_dump_syms_args, DEFAULT_DUMP_SYMS};

/// Environment variable naming the symbol-dump program.
pub const DUMP_SYMS_ENV: &str = "DUMP_SYMS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config file extension for {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),
}

/// Dependency inspector selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorConfig {
    #[serde(default)]
    pub kind: InspectorKind,
    /// Explicit tool path. Falls back to the kind's env override, then its default program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl InspectorConfig {
    pub fn resolved_program(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            self.kind
                .env_override()
                .and_then(std::env::var_os)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(self.kind.default_program()))
        })
    }
}

/// Settings for one collection run.
///
/// May be loaded from a JSON or YAML file; command-line flags are layered on top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectConfig {
    /// Symbol-dump program. `None` means `$DUMP_SYMS` or `dump_syms`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump_syms: Option<PathBuf>,
    /// Flags placed before the input path when running the symbol dumper.
    pub dump_syms_args: Vec<String>,
    pub inspector: InspectorConfig,
    /// Directories searched for dependencies; empty means the platform variable.
    pub library_path: Vec<PathBuf>,
    /// Stage the archive and move it into place only on success.
    pub atomic: bool,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            dump_syms: None,
            dump_syms_args: default_dump_syms_args(),
            inspector: InspectorConfig::default(),
            library_path: Vec::new(),
            atomic: false,
        }
    }
}

impl CollectConfig {
    /// Load a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let parse_err = |message: String| ConfigError::Parse { path: path.to_path_buf(), message };

        match path.extension().and_then(|e| e.to_str()).unwrap_or_default() {
            "json" => serde_json::from_str(&body).map_err(|e| parse_err(e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(&body).map_err(|e| parse_err(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn resolved_dump_syms(&self) -> PathBuf {
        self.dump_syms.clone().unwrap_or_else(|| {
            std::env::var_os(DUMP_SYMS_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP_SYMS))
        })
    }
}
