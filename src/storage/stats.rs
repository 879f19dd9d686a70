//! Stats Aggregator
//!
//! Derives `{count, size}` of a namespace's live entries by walking its
//! files on every call. Nothing is cached, so the result always reflects
//! what is on disk.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ScanPolicy;
use crate::error::Result;

use super::scan::{scan_namespace, ScanOptions, ScannedFile};

/// Aggregate over the live entries of one namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Number of live entries
    pub count: u64,
    /// Sum of their sizes in bytes
    pub size: u64,
}

/// Aggregate the live entries under `dir` as of `now`
///
/// Best effort: files that cannot be decoded are logged and left out.
/// The raw input (when `raw_input` is set) always counts with its byte
/// length; value records count with their cached size unless expired.
pub fn collect_stats(dir: &Path, raw_input: bool, now: DateTime<Utc>) -> Result<Stats> {
    let options = ScanOptions {
        raw_input,
        policy: ScanPolicy::Tolerant,
    };

    let mut stats = Stats::default();
    for file in scan_namespace(dir, options)? {
        match file {
            ScannedFile::Input { size, .. } => {
                stats.count += 1;
                stats.size += size;
            }
            ScannedFile::Record { record, .. } if !record.is_expired(now) => {
                stats.count += 1;
                stats.size += record.size;
            }
            ScannedFile::Record { .. } | ScannedFile::Skipped { .. } => {}
        }
    }

    Ok(stats)
}
