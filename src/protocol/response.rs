//! Response definitions
//!
//! Outputs of engine operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::NamespaceRecord;
use crate::storage::Stats;

use super::Page;

/// A namespace as reported to callers, with freshly computed stats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub id: String,
    pub name: String,
    pub actor_id: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stats: Stats,
}

impl NamespaceInfo {
    pub fn from_record(record: NamespaceRecord, stats: Stats) -> Self {
        Self {
            id: record.id,
            name: record.name,
            actor_id: record.actor_id,
            run_id: record.run_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
            stats,
        }
    }
}

/// A live key and the size of its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key: String,
    pub size: u64,
}

/// Outcome of reading a key that exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueLookup {
    /// The stored value
    Live(String),
    /// The record is still on disk but past its expiration
    Expired,
}

impl ValueLookup {
    /// The value, or an empty string for an expired record
    pub fn into_value(self) -> String {
        match self {
            ValueLookup::Live(value) => value,
            ValueLookup::Expired => String::new(),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, ValueLookup::Expired)
    }
}

/// Result of `Engine::execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Response {
    /// Id of a newly created namespace
    NamespaceId(String),
    Namespace(NamespaceInfo),
    Namespaces(Page<NamespaceInfo>),
    Value(String),
    Keys(Page<KeyInfo>),
    /// Number of items applied by a bulk write
    Count(u64),
    /// Plain success flag
    Done(bool),
}
