// perfsplit - core/pool.rs
//
// The log pool: lines grouped by IP key, shared between ingest tasks.
//
// Concurrency: every bucket lives in a `DashMap` shard. `insert` appends
// while holding the shard's write lock, so two first-inserters for the same
// key always end up in one bucket. `take` removes a bucket in a single call.

use crate::core::model::PooledLine;
use dashmap::DashMap;
use std::ops::Range;

/// Lines grouped by extracted IP key. The empty key holds unclassified lines.
#[derive(Debug, Default)]
pub struct LogPool {
    buckets: DashMap<String, Vec<PooledLine>>,
}

impl LogPool {
    pub fn new() -> Self {
        Self {
            buckets: DashMap::new(),
        }
    }

    /// Append `line` to the bucket for `key`, creating the bucket on first use.
    pub fn insert(&self, key: &str, line: PooledLine) {
        // Fast path skips the key allocation once the bucket exists.
        if let Some(mut bucket) = self.buckets.get_mut(key) {
            bucket.push(line);
            return;
        }
        self.buckets.entry(key.to_owned()).or_default().push(line);
    }

    /// Append `line` under the key found at `key` within its own text.
    ///
    /// The key is borrowed from the line rather than copied out first, so an
    /// existing bucket is reached without allocating. An empty range is the
    /// empty key.
    pub fn insert_keyed(&self, line: PooledLine, key: Range<usize>) {
        let key = String::from_utf8_lossy(&line.text[key]);
        if let Some(mut bucket) = self.buckets.get_mut(&*key) {
            drop(key);
            bucket.push(line);
            return;
        }
        let key = key.into_owned();
        self.buckets.entry(key).or_default().push(line);
    }

    /// Remove the bucket for `key` and hand its lines to the caller.
    pub fn take(&self, key: &str) -> Option<Vec<PooledLine>> {
        self.buckets.remove(key).map(|(_, lines)| lines)
    }

    /// Sorted snapshot of the keys currently in the pool.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.buckets.iter().map(|e| e.key().clone()).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of distinct keys.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of pooled lines across all buckets.
    pub fn line_count(&self) -> u64 {
        self.buckets.iter().map(|e| e.value().len() as u64).sum()
    }

    /// Number of lines in the bucket for `key` (0 if absent).
    pub fn bucket_len(&self, key: &str) -> usize {
        self.buckets.get(key).map_or(0, |b| b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
