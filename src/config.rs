//! Configuration for nskv
//!
//! Centralized configuration with sensible defaults. The storage root is
//! always passed in explicitly so every engine (and every test) can own an
//! isolated directory tree.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{KvError, Result};

/// Default TTL applied when a caller passes an expiration of zero (7 days)
pub const DEFAULT_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Id of the reserved default namespace
pub const DEFAULT_NAMESPACE: &str = "default";

/// Main configuration for an nskv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all namespaces
    /// Internal structure:
    ///   {data_dir}/
    ///     └── {namespace_id}/
    ///           ├── metadata     (namespace record)
    ///           └── {key}        (one value record per key)
    pub data_dir: PathBuf,

    /// Id of the namespace that owns the reserved input slot
    pub default_namespace: String,

    // -------------------------------------------------------------------------
    // Record Configuration
    // -------------------------------------------------------------------------
    /// TTL substituted for an expiration of zero (seconds)
    pub default_ttl_secs: u64,

    /// How `list_keys` treats files that fail to decode
    pub scan_policy: ScanPolicy,

    // -------------------------------------------------------------------------
    // Maintenance Configuration
    // -------------------------------------------------------------------------
    /// Period of the background expired-record sweep, if any
    pub sweep_interval: Option<Duration>,
}

/// Policy for undecodable files met while walking a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPolicy {
    /// Log and skip the file
    #[default]
    Tolerant,

    /// Abort the walk with `MalformedRecord`
    Strict,
}

impl FromStr for ScanPolicy {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tolerant" => Ok(ScanPolicy::Tolerant),
            "strict" => Ok(ScanPolicy::Strict),
            other => Err(KvError::Config(format!("unknown scan policy '{}'", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./nskv_data"),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            default_ttl_secs: DEFAULT_TTL_SECS,
            scan_policy: ScanPolicy::Tolerant,
            sweep_interval: None,
        }
    }
}

impl Config {
    /// Environment variable naming the storage root
    pub const ENV_DATA_DIR: &'static str = "NSKV_DATA_DIR";
    /// Environment variable overriding the default TTL (seconds)
    pub const ENV_DEFAULT_TTL_SECS: &'static str = "NSKV_DEFAULT_TTL_SECS";
    /// Environment variable selecting `tolerant` or `strict` key listing
    pub const ENV_SCAN_POLICY: &'static str = "NSKV_SCAN_POLICY";
    /// Environment variable enabling the background sweep (seconds)
    pub const ENV_SWEEP_INTERVAL_SECS: &'static str = "NSKV_SWEEP_INTERVAL_SECS";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Defaults overlaid with any `NSKV_*` environment variables that are set
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();

        if let Some(dir) = env_var(Self::ENV_DATA_DIR) {
            builder = builder.data_dir(dir);
        }
        if let Some(ttl) = env_var(Self::ENV_DEFAULT_TTL_SECS) {
            builder = builder.default_ttl_secs(parse_secs(Self::ENV_DEFAULT_TTL_SECS, &ttl)?);
        }
        if let Some(policy) = env_var(Self::ENV_SCAN_POLICY) {
            builder = builder.scan_policy(policy.parse()?);
        }
        if let Some(secs) = env_var(Self::ENV_SWEEP_INTERVAL_SECS) {
            let secs = parse_secs(Self::ENV_SWEEP_INTERVAL_SECS, &secs)?;
            builder = builder.sweep_interval(Duration::from_secs(secs));
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    ///
    /// A zero default TTL would expire every record written with expiration
    /// 0 immediately, and a zero sweep interval would sweep without pause.
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl_secs == 0 {
            return Err(KvError::Config("default TTL must be positive".into()));
        }
        if matches!(self.sweep_interval, Some(interval) if interval.is_zero()) {
            return Err(KvError::Config("sweep interval must be positive".into()));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| KvError::Config(format!("{}={:?}: {}", name, raw, e)))
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all namespaces)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the id of the reserved default namespace
    pub fn default_namespace(mut self, id: impl Into<String>) -> Self {
        self.config.default_namespace = id.into();
        self
    }

    /// Set the TTL used when a record is written with expiration 0
    pub fn default_ttl_secs(mut self, secs: u64) -> Self {
        self.config.default_ttl_secs = secs;
        self
    }

    /// Set the key listing scan policy
    pub fn scan_policy(mut self, policy: ScanPolicy) -> Self {
        self.config.scan_policy = policy;
        self
    }

    /// Set the background sweep period
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = Some(interval);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
