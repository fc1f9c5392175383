use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use symcollect_core::config::InspectorConfig;
use symcollect_core::deps::InspectorKind;
use symcollect_core::{CollectConfig, CollectReport, Collector};

/// Options of the `collect-symbols` command line.
#[derive(Args, Debug, Clone, Default)]
pub struct CollectArgs {
    /// The file from which to collect symbols.
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output archive. Must end in `.zip`; the work directory is this path without the suffix.
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// The machine specific dump_syms binary to use.
    #[arg(long, value_name = "PATH")]
    pub dumpsyms: Option<PathBuf>,

    /// Inspect dependencies with this objdump binary (`objdump -x`).
    #[arg(long, value_name = "PATH", conflicts_with_all = ["readelf", "native"])]
    pub objdump: Option<PathBuf>,

    /// Inspect dependencies with this readelf binary (`readelf -d`).
    #[arg(long, value_name = "PATH", conflicts_with = "native")]
    pub readelf: Option<PathBuf>,

    /// Read dependencies directly from the binary instead of running a tool.
    #[arg(long, default_value_t = false)]
    pub native: bool,

    /// Directory in which to look for shared libraries. Repeatable, searched in order.
    /// Defaults to the platform library search variable (e.g., LD_LIBRARY_PATH).
    #[arg(long = "library-path", value_name = "PATH")]
    pub library_path: Vec<PathBuf>,

    /// JSON or YAML file with default settings; flags override it.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the archive only if every module was collected.
    #[arg(long, default_value_t = false)]
    pub atomic: bool,

    /// Print the run report as JSON instead of a summary.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Load the optional config file and layer command-line flags on top.
pub fn resolve_config(args: &CollectArgs) -> Result<CollectConfig> {
    let mut config = match &args.config {
        Some(path) => CollectConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CollectConfig::default(),
    };

    if let Some(dump_syms) = &args.dumpsyms {
        config.dump_syms = Some(dump_syms.clone());
    }
    if let Some(path) = &args.objdump {
        config.inspector =
            InspectorConfig { kind: InspectorKind::Objdump, path: Some(path.clone()) };
    } else if let Some(path) = &args.readelf {
        config.inspector =
            InspectorConfig { kind: InspectorKind::Readelf, path: Some(path.clone()) };
    } else if args.native {
        config.inspector = InspectorConfig { kind: InspectorKind::Native, path: None };
    }
    if !args.library_path.is_empty() {
        config.library_path = args.library_path.clone();
    }
    config.atomic |= args.atomic;

    Ok(config)
}

/// Collect symbols for the target and its dependencies into the archive.
pub fn collect_command(args: &CollectArgs) -> Result<CollectReport> {
    if args.target.as_os_str().is_empty() {
        return Err(anyhow!("TARGET must not be empty"));
    }
    let config = resolve_config(args)?;
    let collector = Collector::from_config(&config)?;

    let report = collector
        .collect(&args.target, &args.archive)
        .with_context(|| format!("Failed to collect symbols for {}", args.target.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(report)
}

fn print_summary(report: &CollectReport) {
    println!("Collected {} module(s) into {}", report.modules.len(), report.archive.display());
    for module in &report.modules {
        let identity = if module.identity.is_empty() { "<no id>" } else { &module.identity };
        println!("  - {} [{}] -> {}", module.file_name, identity, module.entry_path);
    }
    println!("Work dir: {}", report.work_dir.display());
}
