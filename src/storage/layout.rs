//! Path Layout
//!
//! Maps namespace ids and keys to paths under the storage root:
//! ```text
//! {root}/{namespace_id}/            namespace directory
//! {root}/{namespace_id}/metadata    namespace record
//! {root}/{namespace_id}/{key}       value record
//! ```

use std::path::{Path, PathBuf};

use crate::error::{KvError, Result};

/// File name of the namespace record inside a namespace directory
pub const METADATA_FILE: &str = "metadata";

/// Reserved key holding a run's raw input in the default namespace
pub const INPUT_KEY: &str = "INPUT";

/// Prefix of in-flight files written before being renamed into place
pub const STAGING_PREFIX: &str = ".nskv-";

/// Pure path mapping rooted at one storage directory
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root containing every namespace directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn namespace_dir(&self, namespace_id: &str) -> PathBuf {
        self.root.join(namespace_id)
    }

    pub fn metadata_path(&self, namespace_id: &str) -> PathBuf {
        self.namespace_dir(namespace_id).join(METADATA_FILE)
    }

    pub fn record_path(&self, namespace_id: &str, key: &str) -> PathBuf {
        self.namespace_dir(namespace_id).join(key)
    }

    /// Check that `name` maps to exactly one path component under its parent
    pub fn validate_component(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(KvError::InvalidArgument("name must not be empty".into()));
        }
        if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(KvError::InvalidArgument(format!(
                "'{}' is not a valid path component",
                name
            )));
        }
        Ok(())
    }

    /// True for file names that never hold a value record
    pub fn is_reserved_file(name: &str) -> bool {
        name == METADATA_FILE || name.starts_with(STAGING_PREFIX)
    }
}
