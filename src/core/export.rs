// perfsplit - core/export.rs
//
// Drains the log pool into one output file per IP key.
//
// Each bucket is removed from the pool before its file is written, so a
// bucket is attempted at most once per run and its memory is released as
// soon as its file is done, whether or not the write succeeded.

use crate::core::model::{ExportReport, PooledLine};
use crate::core::pool::LogPool;
use crate::util::constants;
use crate::util::error::ExportError;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output naming for exported buckets.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Leading part of every output file name.
    pub file_prefix: String,

    /// Token used in place of the empty key.
    pub unclassified_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_prefix: constants::DEFAULT_FILE_PREFIX.to_string(),
            unclassified_name: constants::DEFAULT_UNCLASSIFIED_NAME.to_string(),
        }
    }
}

impl ExportConfig {
    /// Reject a prefix or sentinel that would not stay inside the export
    /// directory as a single file name component.
    pub fn validate(&self) -> Result<(), ExportError> {
        for (field, value) in [
            ("file prefix", &self.file_prefix),
            ("unclassified name", &self.unclassified_name),
        ] {
            if !is_file_name_safe(value) {
                return Err(ExportError::InvalidName {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

/// True if `name` can be used as part of a single file name.
pub fn is_file_name_safe(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// File name for the bucket with `key`: `<prefix>.<key>.txt`.
///
/// The empty key maps to the unclassified token. Path separators, which the
/// default classifier can never capture, are replaced so the name stays a
/// single path component. Distinct keys may therefore share a name; see
/// [`assign_file_names`].
pub fn output_file_name(key: &str, config: &ExportConfig) -> String {
    file_name_with_suffix(&file_token(key, config), 0, config)
}

fn file_token(key: &str, config: &ExportConfig) -> String {
    let token = if key.is_empty() {
        config.unclassified_name.as_str()
    } else {
        key
    };
    token.replace(['/', '\\'], "_")
}

fn file_name_with_suffix(token: &str, suffix: usize, config: &ExportConfig) -> String {
    if suffix == 0 {
        format!(
            "{}.{}.{}",
            config.file_prefix,
            token,
            constants::OUTPUT_EXTENSION
        )
    } else {
        format!(
            "{}.{}.{}.{}",
            config.file_prefix,
            token,
            suffix,
            constants::OUTPUT_EXTENSION
        )
    }
}

/// Give every key its own output file name.
///
/// Names are claimed in priority order: the empty key first (its sentinel
/// name is reserved), then keys used verbatim, then keys whose separators
/// were replaced. A key whose name is taken gets the first free numeric
/// suffix, `<prefix>.<token>.<n>.txt`. Names are compared case-insensitively
/// so the result is also collision-free on case-folding filesystems.
///
/// Returns `(key, file name)` pairs in priority order.
pub fn assign_file_names(keys: &[String], config: &ExportConfig) -> Vec<(String, String)> {
    let mut ordered: Vec<(u8, &String, String)> = keys
        .iter()
        .map(|key| {
            let token = file_token(key, config);
            let rank = if key.is_empty() {
                0
            } else if token == *key {
                1
            } else {
                2
            };
            (rank, key, token)
        })
        .collect();
    ordered.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

    let mut taken: HashSet<String> = HashSet::with_capacity(ordered.len());
    let mut names = Vec::with_capacity(ordered.len());
    for (_, key, token) in ordered {
        let mut suffix = 0;
        let mut name = file_name_with_suffix(&token, suffix, config);
        while !taken.insert(name.to_lowercase()) {
            suffix += 1;
            name = file_name_with_suffix(&token, suffix, config);
        }
        if suffix > 0 {
            tracing::warn!(
                key = %key,
                file = %name,
                "Output name already used by another key; writing to a suffixed file"
            );
        }
        names.push((key.clone(), name));
    }
    names
}

/// Write `lines` to `writer` one per line, in source order. Line bytes are
/// written unchanged.
///
/// Returns the number of lines written.
pub fn write_lines<W: Write>(lines: &mut [PooledLine], writer: W) -> std::io::Result<u64> {
    lines.sort_unstable_by_key(PooledLine::position);

    let mut out = BufWriter::with_capacity(constants::WRITE_BUFFER_SIZE, writer);
    for line in lines.iter() {
        out.write_all(&line.text)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(lines.len() as u64)
}

/// Create (or truncate) `dir/file_name` and write `lines` to it.
pub fn export_bucket(
    dir: &Path,
    file_name: &str,
    mut lines: Vec<PooledLine>,
) -> Result<(PathBuf, u64), ExportError> {
    let path = dir.join(file_name);
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(io_err)?;
    let written = write_lines(&mut lines, file).map_err(io_err)?;
    Ok((path, written))
}

/// Export every bucket in `pool` to `dir`, in parallel on the current rayon
/// pool. The pool is empty afterwards.
///
/// A failed bucket is logged and counted; it does not stop the others.
pub fn export_pool(pool: &LogPool, dir: &Path, config: &ExportConfig) -> ExportReport {
    let names = assign_file_names(&pool.keys(), config);

    let results: Vec<Result<(PathBuf, u64), ExportError>> = names
        .into_par_iter()
        .filter_map(|(key, file_name)| {
            let lines = pool.take(&key)?;
            let result = export_bucket(dir, &file_name, lines);
            match &result {
                Ok((path, count)) => {
                    tracing::info!(file = %path.display(), lines = count, "Exported");
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Export failed");
                }
            }
            Some(result)
        })
        .collect();

    let mut report = ExportReport::default();
    for result in results {
        match result {
            Ok((path, count)) => {
                report.written.push(path);
                report.lines_written += count;
            }
            Err(_) => report.failed += 1,
        }
    }
    report.written.sort();
    report
}
