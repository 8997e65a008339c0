// perfsplit - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing and the root directory check
// 2. config.toml loading and CLI overrides
// 3. Logging initialisation
// 4. Running the split and mapping failures to exit statuses

use clap::Parser;
use perfsplit::app::split::{self, OutputTarget, SplitOptions, SplitProgress};
use perfsplit::core::discovery::{self, DiscoveryConfig};
use perfsplit::core::export::ExportConfig;
use perfsplit::platform::config::{self, SplitConfig};
use perfsplit::util::constants;
use perfsplit::util::error::SplitError;
use perfsplit::util::logging;
use std::path::PathBuf;

const RULE: &str = "------------------------------";

/// perfsplit - split performance logs into one file per source IP.
///
/// Scans ROOT recursively for performance log files, groups their lines by
/// the IP address that follows each line's timestamp, and writes one file
/// per IP.
#[derive(Parser, Debug)]
#[command(name = "perfsplit", version, about)]
struct Cli {
    /// Directory containing the performance logs.
    root: Option<PathBuf>,

    /// File name pattern of logs to read (repeatable). Default: SrvLog_Perf.txt*
    #[arg(short = 'i', long = "include")]
    include: Vec<String>,

    /// Output file prefix: files are named <PREFIX>.<IP>.txt
    #[arg(short = 'p', long = "prefix")]
    prefix: Option<String>,

    /// Custom line pattern; must define a named group (?P<ip>...).
    #[arg(long = "pattern-regex")]
    pattern_regex: Option<String>,

    /// Write output files to this directory.
    #[arg(short = 'o', long = "output-dir", conflicts_with = "flat")]
    output_dir: Option<PathBuf>,

    /// Write output files directly into ROOT instead of a timestamped subdirectory.
    #[arg(long = "flat")]
    flat: bool,

    /// Worker threads (0 = one per available core).
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Path to config.toml (default: platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let Some(root) = cli.root.clone() else {
        println!("No log directory given.");
        println!("Usage: perfsplit <ROOT>   (see --help)");
        std::process::exit(constants::EXIT_MISSING_ARGUMENT);
    };

    // The root is checked before anything else so a bad root always exits
    // with its own status, whatever else is wrong.
    if let Err(e) = discovery::validate_root(&root) {
        println!("{e}");
        std::process::exit(constants::EXIT_ROOT_NOT_FOUND);
    }

    let loaded = match config::load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{e}");
            std::process::exit(constants::EXIT_STARTUP_FAILURE);
        }
    };

    logging::init(cli.debug, loaded.config.log_level.as_deref());
    tracing::info!(version = constants::APP_VERSION, "perfsplit starting");
    match &loaded.source {
        Some(path) => tracing::info!(path = %path.display(), "Loaded config.toml"),
        None => tracing::debug!("No config.toml found; using defaults"),
    }
    for warning in &loaded.warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let options = build_options(&cli, root, loaded.config);

    println!("{RULE}");
    println!("Splitting logs under: {}", options.root.display());
    println!(
        "Looking for files:    {}",
        options.discovery.include_patterns.join(", ")
    );

    match split::run_split(&options, print_progress) {
        Ok(summary) => {
            println!("{RULE}");
            for path in &summary.export.written {
                println!("Exported => {}", path.display());
            }
            if summary.ingest.files_failed > 0 || summary.export.failed > 0 {
                println!(
                    "{} file(s) could not be read and {} output file(s) could not be written; see log.",
                    summary.ingest.files_failed, summary.export.failed
                );
            }
            println!(
                "Done: {} lines from {} file(s) written to {} file(s) in {:.2?}.",
                summary.export.lines_written,
                summary.files_discovered,
                summary.export.written.len(),
                summary.duration
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Split failed");
            println!("{e}");
            std::process::exit(exit_status(&e));
        }
    }
}

/// Merge CLI flags over the loaded configuration.
fn build_options(cli: &Cli, root: PathBuf, config: SplitConfig) -> SplitOptions {
    let include_patterns = if cli.include.is_empty() {
        config.include_patterns
    } else {
        cli.include.clone()
    };

    let output = match &cli.output_dir {
        Some(dir) => OutputTarget::Dir(dir.clone()),
        None if cli.flat || !config.timestamped_dir => OutputTarget::Root,
        None => OutputTarget::Timestamped,
    };

    SplitOptions {
        root,
        discovery: DiscoveryConfig {
            max_depth: config.max_depth,
            include_patterns,
            exclude_patterns: config.exclude_patterns,
        },
        ip_pattern: cli.pattern_regex.clone().unwrap_or(config.ip_pattern),
        export: ExportConfig {
            file_prefix: cli.prefix.clone().unwrap_or(config.file_prefix),
            unclassified_name: config.unclassified_name,
        },
        output,
        worker_threads: cli.threads.unwrap_or(config.worker_threads),
    }
}

fn print_progress(progress: &SplitProgress) {
    match progress {
        SplitProgress::FilesDiscovered { count } => {
            println!("Found {count} log file(s).");
        }
        SplitProgress::Warning { message } => {
            println!("Warning: {message}");
        }
        SplitProgress::PoolReady { buckets, lines } => {
            println!("{RULE}");
            println!("Parsing complete: {lines} line(s) across {buckets} IP(s).");
        }
        SplitProgress::ExportStarted { dir } => {
            println!("{RULE}");
            println!("Export directory: {}", dir.display());
        }
    }
}

/// Exit status for a fatal startup error.
fn exit_status(error: &SplitError) -> i32 {
    match error {
        SplitError::Discovery(_) => constants::EXIT_ROOT_NOT_FOUND,
        _ => constants::EXIT_STARTUP_FAILURE,
    }
}
