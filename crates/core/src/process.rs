//! Running external tools.
//!
//! Both the dependency inspector and the symbol dumper shell out to
//! platform tools. They share one primitive here, which maps the ways a child
//! process can go wrong onto [`ToolError`].

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use thiserror::Error;

/// Failure while running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started at all (missing, not executable, ...).
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program did not exit normally (e.g., killed by a signal).
    #[error("{program} terminated abnormally")]
    Terminated { program: String },

    /// The program exited with a non-zero status.
    #[error("{program} exited with status {code}{}", format_stderr(.stderr))]
    Failed { program: String, code: i32, stderr: String },

    /// The tool's standard output could not be redirected to a file.
    #[error("failed to create output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tool ran but its result could not be interpreted.
    #[error("{program}: {message}")]
    Invalid { program: String, message: String },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Human-readable program name used in errors and logs.
pub fn program_name(command: &Command) -> String {
    command.get_program().to_string_lossy().to_string()
}

/// Run `command` to completion, capturing stdout and stderr.
///
/// Stdin is closed. A spawn failure, abnormal termination or non-zero exit
/// status is returned as the matching [`ToolError`] variant.
pub fn run_captured(command: &mut Command) -> Result<Output, ToolError> {
    let program = program_name(command);
    tracing::debug!(program = %program, args = ?command.get_args().collect::<Vec<_>>(), "running tool");

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|source| ToolError::Spawn { program: program.clone(), source })?;
    check_status(&program, output.status, &output.stderr)?;
    Ok(output)
}

/// Run `command` with its standard output written verbatim to `destination`.
///
/// The destination file is created (or truncated) before the tool starts, so
/// it exists even when the tool fails.
pub fn run_to_file(command: &mut Command, destination: &Path) -> Result<(), ToolError> {
    let program = program_name(command);
    let file = File::create(destination)
        .map_err(|source| ToolError::Output { path: destination.to_path_buf(), source })?;

    tracing::debug!(
        program = %program,
        args = ?command.get_args().collect::<Vec<_>>(),
        output = %destination.display(),
        "running tool"
    );

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(file))
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| ToolError::Spawn { program: program.clone(), source })?;
    check_status(&program, output.status, &output.stderr)
}

fn check_status(program: &str, status: ExitStatus, stderr: &[u8]) -> Result<(), ToolError> {
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(ToolError::Failed {
            program: program.to_string(),
            code,
            stderr: String::from_utf8_lossy(stderr).to_string(),
        }),
        None => Err(ToolError::Terminated { program: program.to_string() }),
    }
}
