use anyhow::Result;
use clap::Parser;
use tracing::Level;

use collect_symbols::logging::{init_logging, parse_level};
use collect_symbols::{collect_command, CollectArgs};

/// Collect Breakpad symbols for a binary and its shared-library dependencies.
///
/// Runs dump_syms on TARGET and on every library it links against, then packs
/// the symbol files into ARCHIVE as `symbols/<module>/<id>/<module>.sym`.
#[derive(Parser, Debug)]
#[command(
    name = "collect-symbols",
    version,
    about = "Collect Breakpad symbols for a binary and its dependencies",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    collect: CollectArgs,

    /// Log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, default_value = "warn", value_parser = parse_level)]
    log_level: Level,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { cli.log_level });

    collect_command(&cli.collect)?;
    Ok(())
}
