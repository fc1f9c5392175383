//! Discovering the runtime libraries a binary links against.
//!
//! The default resolver asks a platform inspection tool (`objdump -x` or
//! `readelf -d`) and scrapes its text output. With the `native-resolver`
//! feature, [`NativeResolver`] reads the same information straight from the
//! object file instead.

#[cfg(feature = "native-resolver")]
pub mod native;

use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::process::{run_captured, ToolError};

#[cfg(feature = "native-resolver")]
pub use native::NativeResolver;

/// Anything that can list the first-level runtime dependencies of a file.
pub trait DependencyResolver {
    /// Library names in the order the binary declares them.
    fn dependencies(&self, path: &Path) -> Result<Vec<String>, ToolError>;

    fn name(&self) -> &'static str;
}

/// Which external inspection tool to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectorKind {
    #[default]
    Objdump,
    Readelf,
    /// Structured reader; only available with the `native-resolver` feature.
    Native,
}

impl InspectorKind {
    /// Default program name for tool-backed kinds.
    pub fn default_program(self) -> &'static str {
        match self {
            InspectorKind::Objdump => "objdump",
            InspectorKind::Readelf => "readelf",
            InspectorKind::Native => "native",
        }
    }

    /// Environment variable that overrides the default program.
    pub fn env_override(self) -> Option<&'static str> {
        match self {
            InspectorKind::Objdump => Some("OBJDUMP"),
            InspectorKind::Readelf => Some("READELF"),
            InspectorKind::Native => None,
        }
    }

    fn flag(self) -> &'static str {
        match self {
            InspectorKind::Readelf => "-d",
            _ => "-x",
        }
    }
}

/// Resolver backed by an external inspection tool.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    pub kind: InspectorKind,
    pub program: PathBuf,
}

impl ToolResolver {
    pub fn new(kind: InspectorKind, program: impl Into<PathBuf>) -> Self {
        Self { kind, program: program.into() }
    }

    pub fn objdump(program: impl Into<PathBuf>) -> Self {
        Self::new(InspectorKind::Objdump, program)
    }

    pub fn readelf(program: impl Into<PathBuf>) -> Self {
        Self::new(InspectorKind::Readelf, program)
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        // Tool wording must not depend on the user's locale.
        command.env("LC_ALL", "C").env("LANG", "C").arg(self.kind.flag()).arg(path);
        command
    }
}

impl DependencyResolver for ToolResolver {
    fn dependencies(&self, path: &Path) -> Result<Vec<String>, ToolError> {
        let output = run_captured(&mut self.command(path))?;
        Ok(parse_dependencies(&String::from_utf8_lossy(&output.stdout)))
    }

    fn name(&self) -> &'static str {
        self.kind.default_program()
    }
}

// objdump -x:   "  NEEDED               libc.so.6"
//               "\tDLL Name: KERNEL32.dll"
// readelf -d:   " 0x0000000000000001 (NEEDED)             Shared library: [libc.so.6]"
static OBJDUMP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:NEEDED|DLL Name:)\s+(\S+)\s*$").expect("objdump dependency pattern")
});
static READELF_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(NEEDED\).*\[(.*)\]").expect("readelf dependency pattern"));

/// Extract library names from inspection tool output, in output order.
pub fn parse_dependencies(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            OBJDUMP_LINE
                .captures(line)
                .or_else(|| READELF_LINE.captures(line))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Drop repeated names, keeping the first occurrence and the original order.
pub fn dedup_dependencies(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter(|name| {
            let fresh = seen.insert(name.clone());
            if !fresh {
                tracing::warn!(library = %name, "skipping duplicate dependency");
            }
            fresh
        })
        .collect()
}
