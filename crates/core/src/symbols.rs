//! Producing Breakpad symbol files and reading their `MODULE` header.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::process::{run_to_file, ToolError};

/// Default symbol-dump program.
pub const DEFAULT_DUMP_SYMS: &str = "dump_syms";

/// Wraps the external `dump_syms` tool.
#[derive(Debug, Clone)]
pub struct SymbolDumper {
    pub program: PathBuf,
    /// Flags passed before the input path.
    pub args: Vec<String>,
}

impl Default for SymbolDumper {
    fn default() -> Self {
        Self { program: PathBuf::from(DEFAULT_DUMP_SYMS), args: default_dump_syms_args() }
    }
}

pub fn default_dump_syms_args() -> Vec<String> {
    vec!["-v".to_string()]
}

impl SymbolDumper {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    /// Dump symbols for `binary` into `<work_dir>/<file name>.sym`.
    ///
    /// Returns the path of the written symbol file.
    pub fn dump(&self, binary: &Path, work_dir: &Path) -> Result<PathBuf, ToolError> {
        let symbol_file = work_dir.join(symbol_file_name(binary));
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(binary);
        run_to_file(&mut command, &symbol_file)?;
        Ok(symbol_file)
    }
}

/// File name of a binary as used in symbol paths; falls back to the whole path.
pub fn module_file_name(binary: &Path) -> String {
    binary
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| binary.to_string_lossy().to_string())
}

/// `libfoo.so.1` -> `libfoo.so.1.sym`
pub fn symbol_file_name(binary: &Path) -> String {
    format!("{}.sym", module_file_name(binary))
}

/// Fields of a Breakpad `MODULE <os> <arch> <id> <name>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHeader {
    pub os: String,
    pub arch: String,
    pub id: String,
    /// May be empty or contain spaces.
    pub name: String,
}

impl ModuleHeader {
    /// Parse a single line. Needs the `MODULE` token plus at least three fields.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("MODULE") {
            return None;
        }
        let os = fields.next()?.to_string();
        let arch = fields.next()?.to_string();
        let id = fields.next()?.to_string();
        let name = fields.collect::<Vec<_>>().join(" ");
        Some(Self { os, arch, id, name })
    }

    /// First well-formed `MODULE` record in `path`, if any.
    pub fn read(path: &Path) -> std::io::Result<Option<Self>> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.split(b'\n') {
            let line = line?;
            if let Some(header) = Self::parse_line(&String::from_utf8_lossy(&line)) {
                return Ok(Some(header));
            }
        }
        Ok(None)
    }
}

/// Module identity (fourth `MODULE` field) of a symbol file.
///
/// Any failure yields an empty string; the archive path is then degenerate but
/// collection carries on.
pub fn read_module_identity(symbol_file: &Path) -> String {
    match ModuleHeader::read(symbol_file) {
        Ok(Some(header)) => header.id,
        Ok(None) => {
            tracing::warn!(file = %symbol_file.display(), "no MODULE record in symbol file");
            String::new()
        }
        Err(e) => {
            tracing::warn!(file = %symbol_file.display(), error = %e, "could not read symbol file");
            String::new()
        }
    }
}
