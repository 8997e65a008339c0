// perfsplit - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// These types are the shared vocabulary across all layers.

use std::path::PathBuf;
use std::time::Duration;

// =============================================================================
// Discovery output
// =============================================================================

/// A log file found by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// Absolute or root-relative path to the file.
    pub path: PathBuf,

    /// File size in bytes at discovery time.
    pub size: u64,
}

// =============================================================================
// Pooled lines
// =============================================================================

/// One log line held in the pool, with the position it was read from.
///
/// Provenance does not affect which bucket a line lands in; it only gives the
/// exporter a stable order to write lines in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PooledLine {
    /// Index of the source file in the (path-sorted) discovery list.
    pub source: usize,

    /// 1-based line number within the source file.
    pub line_number: u64,

    /// Raw line bytes with the trailing line terminator removed. Never
    /// re-encoded, so output is byte-identical to input.
    pub text: Vec<u8>,
}

impl PooledLine {
    pub fn new(source: usize, line_number: u64, text: impl Into<Vec<u8>>) -> Self {
        Self {
            source,
            line_number,
            text: text.into(),
        }
    }

    /// Sort key giving file order, then line order.
    pub fn position(&self) -> (usize, u64) {
        (self.source, self.line_number)
    }
}

// =============================================================================
// Phase reports
// =============================================================================

/// Result of the ingest phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files read to the end.
    pub files_read: usize,

    /// Files whose read failed (their partial contribution is still pooled).
    pub files_failed: usize,

    /// Lines pooled across all files, including partial reads.
    pub lines_read: u64,
}

/// Result of the export phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Output files successfully written, sorted by path.
    pub written: Vec<PathBuf>,

    /// Buckets whose output file could not be written.
    pub failed: usize,

    /// Lines written across all successful output files.
    pub lines_written: u64,
}

/// Summary of a complete run.
#[derive(Debug, Clone, Default)]
pub struct SplitSummary {
    /// Files matched by discovery.
    pub files_discovered: usize,

    /// Ingest phase counters.
    pub ingest: IngestReport,

    /// Distinct keys in the pool after ingest (including the empty key).
    pub buckets: usize,

    /// Directory the output files were written to.
    pub export_dir: PathBuf,

    /// Export phase counters.
    pub export: ExportReport,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}
