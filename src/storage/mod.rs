//! Storage Module
//!
//! File-system layer of the engine. The directory tree is the only source
//! of truth; no component keeps namespace or record data in memory across
//! calls.
//!
//! ## Responsibilities
//! - Map namespace ids and keys to paths (`layout`)
//! - Own namespace lifecycle and metadata (`directory`)
//! - Walk namespace files and derive live-entry stats (`scan`, `stats`)
//! - Serialize same-name creates and same-key writes (`locks`)
//! - Remove expired record files on demand (`sweep`)
//!
//! ## On-Disk Layout
//! ```text
//! {data_dir}/
//!   ├── {namespace_id}/
//!   │     ├── metadata          namespace record (JSON)
//!   │     ├── {key}             value record (JSON)
//!   │     └── INPUT             raw run input (default namespace only)
//!   └── ...
//! ```

mod directory;
mod layout;
mod locks;
mod scan;
mod stats;
mod sweep;

pub use directory::NamespaceDirectory;
pub use layout::{Layout, INPUT_KEY, METADATA_FILE, STAGING_PREFIX};
pub use locks::{key_slot, LockTable, SlotGuard, PRUNE_THRESHOLD};
pub use scan::{scan_namespace, ScanOptions, ScannedFile};
pub use stats::{collect_stats, Stats};
pub use sweep::{sweep_namespace, SweepReport, SweeperHandle};

use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Replace `path` with `bytes` without exposing a partially written file
///
/// The bytes go to a staging file in the same directory which is then
/// renamed over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_data()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}
