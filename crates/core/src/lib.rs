//! symcollect-core
//!
//! Collects Breakpad symbol files for a binary and its first-level runtime
//! dependencies and packages them into a zip archive laid out as
//! `symbols/<module>/<identity>/<module>.sym`, ready for offline minidump
//! symbolication.
//!
//! External tools do the heavy lifting: `dump_syms` writes the symbol files and
//! `objdump`/`readelf` report the libraries a binary needs. This crate drives
//! them, locates the libraries, and builds the archive. The CLI frontend stays
//! a thin wrapper so everything here can be tested directly.

pub mod archive;
pub mod collect;
pub mod config;
pub mod deps;
pub mod locate;
pub mod process;
pub mod symbols;
pub mod util;

pub use collect::{CollectError, CollectReport, CollectedModule, Collector};
pub use config::CollectConfig;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
