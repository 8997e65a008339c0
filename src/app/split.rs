// perfsplit - app/split.rs
//
// Run lifecycle: validate root → discover → ingest (parallel) → export
// (parallel). Both parallel phases run on one bounded rayon pool; export
// starts only after every ingest task has returned, since any file may still
// add lines to any bucket.
//
// Only startup failures are returned as errors. A file that cannot be read,
// or a bucket that cannot be written, is logged and counted in the summary.

use crate::core::classifier::LineClassifier;
use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::export::{self, ExportConfig};
use crate::core::model::{DiscoveredFile, IngestReport, PooledLine, SplitSummary};
use crate::core::pool::LogPool;
use crate::platform;
use crate::util::constants;
use crate::util::error::{ExportError, IngestError, Result};
use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

// =============================================================================
// Options
// =============================================================================

/// Where output files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// A subdirectory of the root named after the run start time.
    Timestamped,
    /// The root directory itself.
    Root,
    /// An explicit directory.
    Dir(PathBuf),
}

/// Everything a run needs.
#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub root: PathBuf,
    pub discovery: DiscoveryConfig,
    pub ip_pattern: String,
    pub export: ExportConfig,
    pub output: OutputTarget,
    /// Worker thread count; 0 uses available parallelism.
    pub worker_threads: usize,
}

impl SplitOptions {
    /// Options with default settings for `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            discovery: DiscoveryConfig::default(),
            ip_pattern: constants::DEFAULT_IP_PATTERN.to_string(),
            export: ExportConfig::default(),
            output: OutputTarget::Timestamped,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
        }
    }
}

/// Milestones reported to the caller while a run progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitProgress {
    /// Discovery finished.
    FilesDiscovered { count: usize },
    /// Non-fatal problem found during discovery.
    Warning { message: String },
    /// Ingest finished; the pool holds this many buckets and lines.
    PoolReady { buckets: usize, lines: u64 },
    /// Export directory created; export is starting.
    ExportStarted { dir: PathBuf },
}

// =============================================================================
// Run
// =============================================================================

/// Run a complete split.
///
/// `on_progress` is called on the caller's thread, never from a worker.
pub fn run_split<F>(options: &SplitOptions, mut on_progress: F) -> Result<SplitSummary>
where
    F: FnMut(&SplitProgress),
{
    let started = Instant::now();
    let started_at = Local::now();

    discovery::validate_root(&options.root)?;
    options.export.validate()?;
    let classifier = LineClassifier::new(&options.ip_pattern)?;

    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(options.worker_threads)
        .thread_name(|i| format!("perfsplit-worker-{i}"))
        .build()?;

    tracing::info!(
        root = %options.root.display(),
        threads = workers.current_num_threads(),
        pattern = classifier.as_str(),
        "Split starting"
    );

    let (files, warnings) = discovery::discover_files(&options.root, &options.discovery)?;
    for message in warnings {
        tracing::warn!(warning = %message, "Discovery warning");
        on_progress(&SplitProgress::Warning { message });
    }
    on_progress(&SplitProgress::FilesDiscovered { count: files.len() });

    // The pool is scoped to this run and dropped (empty) when it returns.
    let pool = LogPool::new();

    let ingest = workers.install(|| ingest_files(&files, &classifier, &pool));
    let buckets = pool.bucket_count();
    let lines = pool.line_count();
    tracing::info!(
        files_read = ingest.files_read,
        files_failed = ingest.files_failed,
        buckets,
        lines,
        "Ingest complete"
    );
    on_progress(&SplitProgress::PoolReady { buckets, lines });

    let export_dir = resolve_export_dir(&options.root, &options.output, started_at);
    std::fs::create_dir_all(&export_dir).map_err(|e| ExportError::CreateDir {
        path: export_dir.clone(),
        source: e,
    })?;
    on_progress(&SplitProgress::ExportStarted {
        dir: export_dir.clone(),
    });

    let export = workers.install(|| export::export_pool(&pool, &export_dir, &options.export));

    let summary = SplitSummary {
        files_discovered: files.len(),
        ingest,
        buckets,
        export_dir,
        export,
        duration: started.elapsed(),
    };

    tracing::info!(
        files = summary.files_discovered,
        outputs = summary.export.written.len(),
        failed = summary.export.failed,
        lines_written = summary.export.lines_written,
        elapsed_ms = summary.duration.as_millis() as u64,
        "Split complete"
    );

    Ok(summary)
}

/// Export directory for `target`, using `started_at` for timestamped names.
pub fn resolve_export_dir(
    root: &Path,
    target: &OutputTarget,
    started_at: DateTime<Local>,
) -> PathBuf {
    match target {
        OutputTarget::Timestamped => {
            root.join(started_at.format(constants::EXPORT_DIR_FORMAT).to_string())
        }
        OutputTarget::Root => root.to_path_buf(),
        OutputTarget::Dir(dir) => dir.clone(),
    }
}

// =============================================================================
// Ingest
// =============================================================================

/// Read every file into `pool` in parallel on the current rayon pool.
///
/// `files[i]` is recorded as source `i` on each of its lines.
pub fn ingest_files(
    files: &[DiscoveredFile],
    classifier: &LineClassifier,
    pool: &LogPool,
) -> IngestReport {
    let outcomes: Vec<std::result::Result<u64, IngestError>> = files
        .par_iter()
        .enumerate()
        .map(|(source, file)| {
            tracing::debug!(file = %file.path.display(), size = file.size, "Reading");
            let outcome = ingest_file(&file.path, source, classifier, pool);
            match &outcome {
                Ok(lines) => {
                    tracing::info!(file = %file.path.display(), lines, "Read complete");
                }
                Err(e) => {
                    tracing::warn!(
                        file = %file.path.display(),
                        lines_kept = e.lines_read(),
                        error = %e,
                        "Read failed"
                    );
                }
            }
            outcome
        })
        .collect();

    let mut report = IngestReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(lines) => {
                report.files_read += 1;
                report.lines_read += lines;
            }
            Err(e) => {
                report.files_failed += 1;
                report.lines_read += e.lines_read();
            }
        }
    }
    report
}

/// Read one file sequentially, classifying each line into `pool`.
///
/// Returns the number of lines pooled. On a read error the lines pooled
/// before it stay in the pool and their count is carried in the error.
pub fn ingest_file(
    path: &Path,
    source: usize,
    classifier: &LineClassifier,
    pool: &LogPool,
) -> std::result::Result<u64, IngestError> {
    let reader = platform::fs::open_log(path).map_err(|e| IngestError::Open {
        file: path.to_path_buf(),
        source: e,
    })?;

    let mut lines_read: u64 = 0;
    let result = platform::fs::for_each_line(reader, |text| {
        lines_read += 1;
        let key = classifier.find(&text).unwrap_or(0..0);
        if key.is_empty() {
            tracing::trace!(
                file = %path.display(),
                line = lines_read,
                preview = %preview(&text),
                "Unclassified line"
            );
        }
        pool.insert_keyed(PooledLine::new(source, lines_read, text), key);
    });

    match result {
        Ok(()) => Ok(lines_read),
        Err(e) => Err(IngestError::Read {
            file: path.to_path_buf(),
            lines_read,
            source: e,
        }),
    }
}

/// Truncated, display-safe copy of `text` for log output.
fn preview(text: &[u8]) -> String {
    String::from_utf8_lossy(text)
        .chars()
        .take(constants::DEBUG_MAX_LINE_PREVIEW)
        .collect()
}
