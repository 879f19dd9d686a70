//! Namespace walk
//!
//! Reads every record file of one namespace directory in file-name order.
//! Shared by the stats aggregator, key listing and the sweeper so they all
//! agree on which files count.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::ScanPolicy;
use crate::error::Result;
use crate::record::{self, ValueRecord};

use super::layout::{Layout, INPUT_KEY};

/// One file met during a namespace walk
#[derive(Debug, Clone)]
pub enum ScannedFile {
    /// Raw reserved input of the default namespace (never expires)
    Input { path: PathBuf, size: u64 },

    /// A decoded value record, live or expired
    Record { path: PathBuf, record: ValueRecord },

    /// A file that could not be read or decoded (tolerant walks only)
    Skipped { path: PathBuf },
}

/// Walk options
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Treat a file named `INPUT` as raw reserved input
    pub raw_input: bool,

    /// What to do with unreadable or undecodable files
    pub policy: ScanPolicy,
}

/// Walk the record files of `dir`
///
/// Subdirectories, the metadata file and staging files are ignored. A file
/// that disappears between listing and reading was deleted concurrently and
/// is silently dropped under either policy. Files whose name is not UTF-8
/// cannot be keys; they are reported as `Skipped` after all other files.
pub fn scan_namespace(dir: &Path, options: ScanOptions) -> Result<Vec<ScannedFile>> {
    let mut names = Vec::new();
    let mut unnamed = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(_) => {
                let path = entry.path();
                tracing::warn!(path = %path.display(), "skipping file with non-UTF-8 name");
                unnamed.push(ScannedFile::Skipped { path });
                continue;
            }
        };
        if Layout::is_reserved_file(&name) {
            continue;
        }
        names.push(name);
    }
    names.sort();

    let mut files = Vec::with_capacity(names.len() + unnamed.len());
    for name in names {
        let path = dir.join(&name);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => match options.policy {
                ScanPolicy::Strict => return Err(e.into()),
                ScanPolicy::Tolerant => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    files.push(ScannedFile::Skipped { path });
                    continue;
                }
            },
        };

        if options.raw_input && name == INPUT_KEY {
            files.push(ScannedFile::Input {
                path,
                size: bytes.len() as u64,
            });
            continue;
        }

        match record::decode::<ValueRecord>(&path, &bytes) {
            Ok(record) => files.push(ScannedFile::Record { path, record }),
            Err(e) => match options.policy {
                ScanPolicy::Strict => return Err(e),
                ScanPolicy::Tolerant => {
                    tracing::warn!(error = %e, "skipping undecodable record");
                    files.push(ScannedFile::Skipped { path });
                }
            },
        }
    }

    files.append(&mut unnamed);
    Ok(files)
}
