//! Engine Module
//!
//! The key-value engine that composes path layout, record codec, namespace
//! directory and stats aggregator behind one API.
//!
//! ## Responsibilities
//! - Namespace CRUD (delegated to `NamespaceDirectory`)
//! - Key set/get/delete, single and bulk, with per-key expiration
//! - Paged key listing
//! - Removal of expired record files, on demand or in the background

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::protocol::{
    BulkSetRequest, Command, CreateNamespaceRequest, KeyInfo, ListKeysRequest, NamespaceInfo,
    Page, Response, SetValueRequest, ValueLookup,
};
use crate::record::{self, ValueRecord};
use crate::storage::{
    key_slot, scan_namespace, sweep_namespace, Layout, LockTable, NamespaceDirectory,
    ScanOptions, ScannedFile, SweepReport, SweeperHandle, INPUT_KEY, METADATA_FILE,
    STAGING_PREFIX,
};

/// The key-value engine
///
/// ## Concurrency Model
///
/// Every operation is an independent sequence of file-system calls; the
/// engine caches nothing, so it is always consistent with what is on disk.
///
/// - **Writes** (set/delete of one key): serialized per `(namespace, key)`
///   by `key_locks`; files are replaced by rename, never rewritten in place
/// - **Reads** (get/list/stats): take no locks
/// - **Namespace create**: serialized per name inside `NamespaceDirectory`
///
/// Locks only exclude callers sharing this `Engine`; separate processes on
/// the same directory still race.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Namespace lifecycle and metadata
    directory: NamespaceDirectory,

    /// Serializes writers of the same key
    key_locks: LockTable,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// Creates the data directory if it doesn't exist. Fails with
    /// `KvError::Config` if the config holds a zero TTL or sweep interval.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let layout = Layout::new(&config.data_dir);
        let directory = NamespaceDirectory::open(layout, config.default_namespace.clone())?;

        tracing::debug!(data_dir = %config.data_dir.display(), "engine opened");

        Ok(Self {
            config,
            directory,
            key_locks: LockTable::new(),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Response> {
        tracing::debug!(op = command.name(), "execute");

        match command {
            Command::CreateNamespace(req) => {
                self.create_namespace(&req).map(Response::NamespaceId)
            }
            Command::GetNamespace { namespace_id } => {
                self.get_namespace(&namespace_id).map(Response::Namespace)
            }
            Command::ListNamespaces(req) => self
                .list_namespaces(req.page, req.page_size, req.desc)
                .map(Response::Namespaces),
            Command::RenameNamespace { namespace_id, name } => {
                self.rename_namespace(&namespace_id, &name).map(Response::Done)
            }
            Command::DeleteNamespace { namespace_id } => {
                self.delete_namespace(&namespace_id).map(Response::Done)
            }
            Command::SetValue(req) => self.set_value(&req).map(Response::Done),
            Command::BulkSetValue(req) => self.bulk_set_value(&req).map(Response::Count),
            Command::GetValue { namespace_id, key } => {
                self.get_value(&namespace_id, &key).map(Response::Value)
            }
            Command::DeleteValue { namespace_id, key } => {
                self.delete_value(&namespace_id, &key).map(Response::Done)
            }
            Command::BulkDeleteValue { namespace_id, keys } => {
                self.bulk_delete_value(&namespace_id, &keys).map(Response::Done)
            }
            Command::ListKeys(req) => self.list_keys(&req).map(Response::Keys),
        }
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    /// Create a namespace, returning its generated id
    pub fn create_namespace(&self, req: &CreateNamespaceRequest) -> Result<String> {
        self.directory.create(&req.name, &req.actor_id, &req.run_id)
    }

    /// Get a namespace with live-entry stats
    pub fn get_namespace(&self, namespace_id: &str) -> Result<NamespaceInfo> {
        self.directory.get(namespace_id)
    }

    /// List namespaces by creation time, one page at a time
    pub fn list_namespaces(
        &self,
        page: u64,
        page_size: u64,
        desc: bool,
    ) -> Result<Page<NamespaceInfo>> {
        self.directory.list(page, page_size, desc)
    }

    pub fn rename_namespace(&self, namespace_id: &str, name: &str) -> Result<bool> {
        self.directory.rename(namespace_id, name)
    }

    /// Delete a namespace and all of its records
    pub fn delete_namespace(&self, namespace_id: &str) -> Result<bool> {
        self.directory.delete(namespace_id)
    }

    pub fn namespace_exists(&self, namespace_id: &str) -> bool {
        self.directory.exists(namespace_id)
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Write a value
    ///
    /// Returns `Ok(false)` without writing for the reserved input key of the
    /// default namespace. An expiration of 0 selects the configured default
    /// TTL. Last writer wins.
    pub fn set_value(&self, req: &SetValueRequest) -> Result<bool> {
        if self.is_reserved_input(&req.namespace_id, &req.key) {
            tracing::debug!(key = %req.key, "refusing to overwrite reserved input");
            return Ok(false);
        }
        check_key(&req.key)?;
        self.require_namespace(&req.namespace_id)?;

        let ttl = match req.expiration {
            0 => self.config.default_ttl_secs,
            secs => secs,
        };
        let record = ValueRecord::new(&req.namespace_id, &req.key, &req.value, ttl, Utc::now());
        let bytes = record::encode(&record)?;
        let path = self.directory.layout().record_path(&req.namespace_id, &req.key);

        let _key_guard = self.key_locks.lock(&key_slot(&req.namespace_id, &req.key));
        crate::storage::write_atomic(&path, &bytes)?;

        tracing::debug!(namespace = %req.namespace_id, key = %req.key, ttl, "set value");
        Ok(true)
    }

    /// Write many values, returning how many were written
    ///
    /// Items that fail are logged and skipped; the rest are still applied.
    pub fn bulk_set_value(&self, req: &BulkSetRequest) -> Result<u64> {
        let mut written = 0;
        for item in &req.items {
            let single = SetValueRequest {
                namespace_id: req.namespace_id.clone(),
                key: item.key.clone(),
                value: item.value.clone(),
                expiration: item.expiration,
            };
            match self.set_value(&single) {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(namespace = %req.namespace_id, key = %item.key, error = %e, "bulk set item failed");
                }
            }
        }
        Ok(written)
    }

    /// Read a value
    ///
    /// An expired record reads as an empty string; use `lookup_value` to
    /// tell the two apart.
    pub fn get_value(&self, namespace_id: &str, key: &str) -> Result<String> {
        self.lookup_value(namespace_id, key).map(ValueLookup::into_value)
    }

    /// Read a value, reporting expiration explicitly
    ///
    /// The reserved input of the default namespace is returned raw and never
    /// expires.
    pub fn lookup_value(&self, namespace_id: &str, key: &str) -> Result<ValueLookup> {
        self.require_namespace(namespace_id)?;
        check_key(key)?;

        let path = self.directory.layout().record_path(namespace_id, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(key_not_found(namespace_id, key))
            }
            Err(e) => return Err(e.into()),
        };

        if self.is_reserved_input(namespace_id, key) {
            return Ok(ValueLookup::Live(String::from_utf8_lossy(&bytes).into_owned()));
        }

        let record: ValueRecord = record::decode(&path, &bytes)?;
        if record.is_expired(Utc::now()) {
            return Ok(ValueLookup::Expired);
        }
        Ok(ValueLookup::Live(record.value))
    }

    /// Delete a value
    ///
    /// Deleting the metadata name is a no-op that reports success. A key that
    /// does not exist fails with `KeyNotFound`.
    pub fn delete_value(&self, namespace_id: &str, key: &str) -> Result<bool> {
        if key == METADATA_FILE {
            return Ok(true);
        }
        self.require_namespace(namespace_id)?;
        Layout::validate_component(key)?;

        let path = self.directory.layout().record_path(namespace_id, key);
        let _key_guard = self.key_locks.lock(&key_slot(namespace_id, key));
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(namespace = %namespace_id, key = %key, "deleted value");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(key_not_found(namespace_id, key)),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete keys in order, stopping at the first failure
    ///
    /// Keys before the failing one stay deleted; keys after it are not tried.
    pub fn bulk_delete_value(&self, namespace_id: &str, keys: &[String]) -> Result<bool> {
        for key in keys {
            self.delete_value(namespace_id, key)?;
        }
        Ok(true)
    }

    /// One page of the live keys of a namespace, in key order
    ///
    /// Undecodable files are skipped or abort the listing according to
    /// `Config::scan_policy`.
    pub fn list_keys(&self, req: &ListKeysRequest) -> Result<Page<KeyInfo>> {
        Page::<KeyInfo>::bounds(0, req.page, req.size)?;
        self.require_namespace(&req.namespace_id)?;

        let dir = self.directory.layout().namespace_dir(&req.namespace_id);
        let options = ScanOptions {
            raw_input: self.directory.is_default(&req.namespace_id),
            policy: self.config.scan_policy,
        };
        let now = Utc::now();

        let mut keys = Vec::new();
        for file in scan_namespace(&dir, options)? {
            match file {
                ScannedFile::Input { size, .. } => keys.push(KeyInfo {
                    key: INPUT_KEY.to_string(),
                    size,
                }),
                ScannedFile::Record { record, .. } if !record.is_expired(now) => {
                    keys.push(KeyInfo {
                        key: record.key,
                        size: record.size,
                    })
                }
                ScannedFile::Record { .. } | ScannedFile::Skipped { .. } => {}
            }
        }

        Page::paginate(keys, req.page, req.size)
    }

    /// Store the raw run input in the default namespace
    ///
    /// Creates the default namespace on first use. This is the only way to
    /// write the reserved input key.
    pub fn put_input(&self, bytes: &[u8]) -> Result<()> {
        self.directory.ensure_default()?;
        let namespace_id = self.directory.default_namespace();

        let path = self.directory.layout().record_path(namespace_id, INPUT_KEY);
        let _key_guard = self.key_locks.lock(&key_slot(namespace_id, INPUT_KEY));
        crate::storage::write_atomic(&path, bytes)?;

        tracing::debug!(namespace = %namespace_id, size = bytes.len(), "stored run input");
        Ok(())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Remove the expired record files of one namespace
    pub fn sweep_namespace(&self, namespace_id: &str) -> Result<SweepReport> {
        self.require_namespace(namespace_id)?;
        let dir = self.directory.layout().namespace_dir(namespace_id);
        sweep_namespace(
            &dir,
            namespace_id,
            self.directory.is_default(namespace_id),
            &self.key_locks,
            Utc::now(),
        )
    }

    /// Remove the expired record files of every namespace
    ///
    /// A namespace deleted while the sweep runs is skipped.
    pub fn sweep_all(&self) -> Result<SweepReport> {
        let mut report = SweepReport::default();
        for namespace_id in self.directory.namespace_ids()? {
            match self.sweep_namespace(&namespace_id) {
                Ok(one) => report.merge(one),
                Err(KvError::NamespaceNotFound(_)) => {}
                Err(KvError::Io(e)) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        if report.removed > 0 {
            tracing::info!(
                scanned = report.scanned,
                removed = report.removed,
                skipped = report.skipped,
                "sweep finished"
            );
        } else {
            tracing::debug!(scanned = report.scanned, "sweep finished, nothing expired");
        }
        Ok(report)
    }

    /// Run `sweep_all` every `interval` on a background thread
    ///
    /// The thread holds only a weak reference, so it never keeps the engine
    /// alive; stop it by stopping or dropping the returned handle.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> Result<SweeperHandle> {
        if interval.is_zero() {
            return Err(KvError::InvalidArgument(
                "sweep interval must be positive".into(),
            ));
        }
        let engine: Weak<Self> = Arc::downgrade(self);
        SweeperHandle::spawn(interval, move || {
            if let Some(engine) = engine.upgrade() {
                if let Err(e) = engine.sweep_all() {
                    tracing::warn!(error = %e, "background sweep failed");
                }
            }
        })
    }

    /// Start the sweeper if `Config::sweep_interval` is set
    pub fn start_configured_sweeper(self: &Arc<Self>) -> Result<Option<SweeperHandle>> {
        match self.config.sweep_interval {
            Some(interval) => self.start_sweeper(interval).map(Some),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the namespace directory
    pub fn directory(&self) -> &NamespaceDirectory {
        &self.directory
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn is_reserved_input(&self, namespace_id: &str, key: &str) -> bool {
        key == INPUT_KEY && self.directory.is_default(namespace_id)
    }

    fn require_namespace(&self, namespace_id: &str) -> Result<()> {
        if self.directory.exists(namespace_id) {
            Ok(())
        } else {
            Err(KvError::NamespaceNotFound(namespace_id.to_string()))
        }
    }
}

/// Reject keys that cannot name a value record file
fn check_key(key: &str) -> Result<()> {
    Layout::validate_component(key)?;
    if key == METADATA_FILE {
        return Err(KvError::InvalidArgument(format!(
            "key name can't use '{}'",
            METADATA_FILE
        )));
    }
    if key.starts_with(STAGING_PREFIX) {
        return Err(KvError::InvalidArgument(format!(
            "key must not start with '{}'",
            STAGING_PREFIX
        )));
    }
    Ok(())
}

fn key_not_found(namespace_id: &str, key: &str) -> KvError {
    KvError::KeyNotFound {
        namespace: namespace_id.to_string(),
        key: key.to_string(),
    }
}
