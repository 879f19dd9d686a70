//! Namespace Directory
//!
//! Lookup and lifecycle of namespaces. Every immediate subdirectory of the
//! storage root is one namespace, described by its `metadata` record.
//!
//! ## Responsibilities
//! - Create namespaces with generated ids and unique names
//! - Read, list (paged, by creation time), rename and delete namespaces
//! - Overlay freshly computed `Stats` on every namespace it returns

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{KvError, Result};
use crate::protocol::{NamespaceInfo, Page};
use crate::record::{self, NamespaceRecord};

use super::layout::Layout;
use super::locks::LockTable;
use super::stats::{collect_stats, Stats};
use super::write_atomic;

/// Namespace lookup/listing layer over the storage root
///
/// ## Concurrency
/// - `create` holds a per-name lock across the uniqueness scan and the
///   metadata write, so two creates of one name cannot both succeed
/// - `rename` holds a per-namespace lock across its read-modify-write
/// - Both only exclude callers sharing this `NamespaceDirectory`
pub struct NamespaceDirectory {
    layout: Layout,

    /// Id whose `INPUT` file is raw reserved input
    default_namespace: String,

    /// Slots: `name:{name}` for create, `meta:{id}` for metadata rewrites
    locks: LockTable,
}

impl NamespaceDirectory {
    /// Open the directory rooted at `layout.root()`, creating it if needed
    pub fn open(layout: Layout, default_namespace: impl Into<String>) -> Result<Self> {
        fs::create_dir_all(layout.root())?;

        Ok(Self {
            layout,
            default_namespace: default_namespace.into(),
            locks: LockTable::new(),
        })
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    /// Whether a namespace directory exists for `namespace_id`
    pub fn exists(&self, namespace_id: &str) -> bool {
        Layout::validate_component(namespace_id).is_ok()
            && self.layout.namespace_dir(namespace_id).is_dir()
    }

    /// Create a namespace and return its generated id
    ///
    /// Fails with `AlreadyExists` if a live namespace already carries `name`
    /// (exact, case-sensitive match).
    pub fn create(&self, name: &str, actor_id: &str, run_id: &str) -> Result<String> {
        if name.is_empty() {
            return Err(KvError::InvalidArgument("namespace name must not be empty".into()));
        }

        let _name_guard = self.locks.lock(&format!("name:{}", name));

        if self.name_taken(name)? {
            return Err(KvError::AlreadyExists(name.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        self.write_new(&id, name, actor_id, run_id)?;
        Ok(id)
    }

    /// Create the reserved default namespace unless it already exists
    ///
    /// The reserved namespace is identified by id only. Its name neither
    /// claims nor collides with a user namespace of the same name.
    pub(crate) fn ensure_default(&self) -> Result<()> {
        let id = self.default_namespace.as_str();
        Layout::validate_component(id)?;

        let _meta_guard = self.locks.lock(&format!("meta:{}", id));
        if self.layout.metadata_path(id).is_file() {
            return Ok(());
        }
        self.write_new(id, id, "", "")
    }

    /// Read a namespace with freshly computed stats
    pub fn get(&self, namespace_id: &str) -> Result<NamespaceInfo> {
        let record = self.read_record(namespace_id)?;
        let stats = self.stats(namespace_id)?;
        Ok(NamespaceInfo::from_record(record, stats))
    }

    /// Read the persisted metadata of a namespace
    pub fn read_record(&self, namespace_id: &str) -> Result<NamespaceRecord> {
        if !self.exists(namespace_id) {
            return Err(KvError::NamespaceNotFound(namespace_id.to_string()));
        }

        let path = self.layout.metadata_path(namespace_id);
        let bytes = fs::read(&path)?;
        record::decode(&path, &bytes)
    }

    /// Live-entry stats of one namespace, computed now
    pub fn stats(&self, namespace_id: &str) -> Result<Stats> {
        let dir = self.layout.namespace_dir(namespace_id);
        collect_stats(&dir, self.is_default(namespace_id), Utc::now())
    }

    /// One page of namespaces ordered by creation time
    ///
    /// Namespaces whose metadata cannot be read or decoded are skipped and do
    /// not count toward `total`. Stats are computed for returned items only.
    pub fn list(&self, page: u64, page_size: u64, desc: bool) -> Result<Page<NamespaceInfo>> {
        let mut records = self.read_all_records()?;

        // Stable sort: equal timestamps keep directory order within this call
        records.sort_by(|(_, a), (_, b)| {
            if desc {
                b.created_at.cmp(&a.created_at)
            } else {
                a.created_at.cmp(&b.created_at)
            }
        });

        let total = records.len();
        let range = Page::<NamespaceInfo>::bounds(total, page, page_size)?;

        let mut items = Vec::with_capacity(range.len());
        for (dir_name, record) in records.drain(range) {
            let stats = match self.stats(&dir_name) {
                Ok(stats) => stats,
                // Deleted since the metadata was read
                Err(KvError::Io(e)) if e.kind() == ErrorKind::NotFound => Stats::default(),
                Err(e) => return Err(e),
            };
            items.push(NamespaceInfo::from_record(record, stats));
        }

        Ok(Page::from_parts(items, total, page, page_size))
    }

    /// Rename a namespace in place; the id never changes
    ///
    /// Name uniqueness is not checked here.
    pub fn rename(&self, namespace_id: &str, new_name: &str) -> Result<bool> {
        let _meta_guard = self.locks.lock(&format!("meta:{}", namespace_id));

        let mut record = self.read_record(namespace_id)?;
        record.name = new_name.to_string();
        record.updated_at = Utc::now();

        write_atomic(
            &self.layout.metadata_path(namespace_id),
            &record::encode(&record)?,
        )?;

        tracing::info!(namespace = %namespace_id, name = %new_name, "renamed namespace");
        Ok(true)
    }

    /// Remove a namespace and everything under it
    ///
    /// Succeeds for an id that never existed.
    pub fn delete(&self, namespace_id: &str) -> Result<bool> {
        Layout::validate_component(namespace_id)?;

        match fs::remove_dir_all(self.layout.namespace_dir(namespace_id)) {
            Ok(()) => {
                tracing::info!(namespace = %namespace_id, "deleted namespace");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Ids of every namespace directory under the root
    pub fn namespace_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(self.layout.root())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(id) => ids.push(id),
                Err(raw) => {
                    tracing::warn!(name = ?raw, "skipping namespace directory with non-UTF-8 name");
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Whether `namespace_id` is the reserved default namespace
    pub fn is_default(&self, namespace_id: &str) -> bool {
        namespace_id == self.default_namespace
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Decoded metadata of every namespace, paired with its directory name
    fn read_all_records(&self) -> Result<Vec<(String, NamespaceRecord)>> {
        let mut records = Vec::new();
        for id in self.namespace_ids()? {
            let path = self.layout.metadata_path(&id);
            if let Some(record) = read_metadata_lenient(&path) {
                records.push((id, record));
            }
        }
        Ok(records)
    }

    /// Whether a user namespace already carries `name`
    fn name_taken(&self, name: &str) -> Result<bool> {
        Ok(self
            .read_all_records()?
            .iter()
            .any(|(id, record)| !self.is_default(id) && record.name == name))
    }

    fn write_new(&self, id: &str, name: &str, actor_id: &str, run_id: &str) -> Result<()> {
        fs::create_dir_all(self.layout.namespace_dir(id))?;

        let record = NamespaceRecord::new(id, name, actor_id, run_id, Utc::now());
        write_atomic(&self.layout.metadata_path(id), &record::encode(&record)?)?;

        tracing::info!(namespace = %id, name = %name, "created namespace");
        Ok(())
    }
}

/// Read metadata, treating a missing or undecodable file as absent
fn read_metadata_lenient(path: &Path) -> Option<NamespaceRecord> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "unreadable namespace metadata");
            }
            return None;
        }
    };

    match record::decode(path, &bytes) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, "skipping namespace with bad metadata");
            None
        }
    }
}
