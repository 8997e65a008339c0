// perfsplit - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "perfsplit";

/// Application identifier used for the config directory.
pub const APP_ID: &str = "perfsplit";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Exit statuses
// =============================================================================

/// The root directory argument was not supplied.
pub const EXIT_MISSING_ARGUMENT: i32 = 1;

/// The root directory does not exist, is not a directory, or is inaccessible.
pub const EXIT_ROOT_NOT_FOUND: i32 = 2;

/// Any other startup failure (bad pattern, bad config, export directory).
pub const EXIT_STARTUP_FAILURE: i32 = 3;

// =============================================================================
// Discovery
// =============================================================================

/// Default include pattern for performance log files.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["SrvLog_Perf.txt*"];

/// Default exclude patterns, tested against file and directory names.
///
/// The first entry matches export folders created by earlier runs so their
/// output is never read back in as input.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]_[0-9][0-9]-[0-9][0-9]-[0-9][0-9]",
    "*.gz",
    "*.zip",
    ".git",
];

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

// =============================================================================
// Classification
// =============================================================================

/// Default line classifier: a 23-character timestamp-like prefix, whitespace,
/// then a dotted-quad token captured as `ip`. The trailing content is matched
/// byte-wise (`(?-u:.)`) so lines in a non-UTF-8 encoding still classify.
pub const DEFAULT_IP_PATTERN: &str =
    r"^[0-9\-\s:.]{23}\s+(?P<ip>\d{1,3}(?:\.\d{1,3}){3})(?:\s(?-u:.)*)?$";

/// Name of the capture group a classifier pattern must define.
pub const IP_CAPTURE_GROUP: &str = "ip";

/// Maximum regex pattern length to prevent pathological patterns.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Ingest
// =============================================================================

/// Default number of worker threads. 0 means use available parallelism.
pub const DEFAULT_WORKER_THREADS: usize = 0;

/// Hard upper bound on configured worker threads.
pub const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

/// Read buffer capacity for input log files.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Maximum length of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Export
// =============================================================================

/// Default prefix for output file names: `<prefix>.<ip>.txt`.
pub const DEFAULT_FILE_PREFIX: &str = "SrvLog_Perf";

/// File name token used for lines that carry no IP address.
pub const DEFAULT_UNCLASSIFIED_NAME: &str = "UNCLASSIFIED";

/// Extension of output files.
pub const OUTPUT_EXTENSION: &str = "txt";

/// `chrono` format for the timestamped export directory.
pub const EXPORT_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Write buffer capacity for output files.
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
