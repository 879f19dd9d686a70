//! Record Module
//!
//! The two record shapes persisted under a namespace directory and the
//! codec that turns them into bytes.
//!
//! ## Encoding
//! Records are stored as compact JSON objects with camelCase fields, so
//! files stay readable across processes and tools:
//! ```text
//! metadata  {"id":..,"name":..,"actorId":..,"runId":..,"createdAt":..,"updatedAt":..}
//! <key>     {"key":..,"value":..,"namespaceId":..,"expiration":..,"expireAt":..,"size":..}
//! ```
//! Timestamps are RFC 3339 strings in UTC.

mod codec;

pub use codec::{decode, encode};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Longest TTL honored; larger values are clamped (100 years)
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

/// Persisted metadata of one namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceRecord {
    pub id: String,
    pub name: String,
    pub actor_id: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NamespaceRecord {
    /// A fresh record with both timestamps set to `now`
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        actor_id: impl Into<String>,
        run_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            actor_id: actor_id.into(),
            run_id: run_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persisted value of one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRecord {
    pub key: String,
    pub value: String,
    pub namespace_id: String,
    /// TTL the record was written with, in seconds
    pub expiration: u64,
    pub expire_at: DateTime<Utc>,
    /// Byte length of `value`, fixed at write time
    pub size: u64,
}

impl ValueRecord {
    /// Build a record that expires `ttl_secs` after `now`
    pub fn new(
        namespace_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl_secs: u64,
        now: DateTime<Utc>,
    ) -> Self {
        let value = value.into();
        let ttl = ttl_secs.min(MAX_TTL_SECS) as i64;
        let expire_at = now + Duration::seconds(ttl);

        Self {
            key: key.into(),
            size: value.len() as u64,
            value,
            namespace_id: namespace_id.into(),
            expiration: ttl_secs,
            expire_at,
        }
    }

    /// A record is expired once its expiration instant is strictly in the past
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expire_at < now
    }
}
