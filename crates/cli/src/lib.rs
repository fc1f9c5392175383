//! Command-line frontend for `symcollect-core`.
//!
//! The binary is a thin wrapper; command functions live here so tests can call
//! them without spawning a process.

pub mod commands;
pub mod logging;

pub use commands::{collect_command, resolve_config, CollectArgs};
