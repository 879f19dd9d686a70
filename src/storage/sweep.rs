//! Expired-record sweep
//!
//! Reads never delete anything; expired record files stay on disk until a
//! sweep removes them. A sweep can be run on demand or periodically from a
//! background thread.
//!
//! ## Safety Against Concurrent Writers
//! Each candidate is re-read under its key lock right before removal, so a
//! value rewritten after the walk saw it expired is never deleted.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam::channel::{self, Sender};

use crate::config::ScanPolicy;
use crate::error::Result;
use crate::record::{self, ValueRecord};

use super::locks::{key_slot, LockTable};
use super::scan::{scan_namespace, ScanOptions, ScannedFile};

/// Outcome of a sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Files examined, including raw input and skipped files
    pub scanned: u64,
    /// Expired record files removed
    pub removed: u64,
    /// Files left alone because they could not be read or decoded
    pub skipped: u64,
}

impl SweepReport {
    pub fn merge(&mut self, other: SweepReport) {
        self.scanned += other.scanned;
        self.removed += other.removed;
        self.skipped += other.skipped;
    }
}

/// Remove the expired record files of one namespace
///
/// The metadata file, the raw input and undecodable files are never removed.
pub fn sweep_namespace(
    dir: &Path,
    namespace_id: &str,
    raw_input: bool,
    key_locks: &LockTable,
    now: DateTime<Utc>,
) -> Result<SweepReport> {
    let options = ScanOptions {
        raw_input,
        policy: ScanPolicy::Tolerant,
    };

    let mut report = SweepReport::default();
    for file in scan_namespace(dir, options)? {
        report.scanned += 1;
        match file {
            ScannedFile::Skipped { .. } => report.skipped += 1,
            ScannedFile::Record { path, record } if record.is_expired(now) => {
                if remove_if_still_expired(&path, namespace_id, key_locks, now)? {
                    report.removed += 1;
                }
            }
            ScannedFile::Record { .. } | ScannedFile::Input { .. } => {}
        }
    }

    if report.removed > 0 {
        tracing::debug!(
            namespace = %namespace_id,
            removed = report.removed,
            "swept expired records"
        );
    }
    Ok(report)
}

fn remove_if_still_expired(
    path: &Path,
    namespace_id: &str,
    key_locks: &LockTable,
    now: DateTime<Utc>,
) -> Result<bool> {
    let key = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return Ok(false),
    };
    let _key_guard = key_locks.lock(&key_slot(namespace_id, &key));

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    let expired = match record::decode::<ValueRecord>(path, &bytes) {
        Ok(current) => current.is_expired(now),
        Err(_) => false,
    };
    if !expired {
        return Ok(false);
    }

    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Handle to a background sweep thread
///
/// The thread stops when the handle is stopped or dropped.
pub struct SweeperHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Run `task` every `interval` on a dedicated thread
    pub(crate) fn spawn<F>(interval: Duration, mut task: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(interval);

        let thread = thread::Builder::new()
            .name("nskv-sweeper".to_string())
            .spawn(move || loop {
                crossbeam::select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => task(),
                }
            })?;

        tracing::debug!(interval_ms = interval.as_millis() as u64, "sweeper started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Stop the thread and wait for an in-flight sweep to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Disconnecting the channel wakes the thread
        self.stop_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("sweeper thread panicked");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
