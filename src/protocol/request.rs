//! Request definitions
//!
//! Inputs to engine operations. Field names serialize in camelCase to match
//! the remote storage service's JSON models.

use serde::{Deserialize, Serialize};

/// Create a namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNamespaceRequest {
    pub name: String,
    #[serde(default)]
    pub actor_id: String,
    #[serde(default)]
    pub run_id: String,
}

impl CreateNamespaceRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_owner(mut self, actor_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        self.actor_id = actor_id.into();
        self.run_id = run_id.into();
        self
    }
}

/// List namespaces, one page at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNamespacesRequest {
    /// 1-indexed page number
    pub page: u64,
    pub page_size: u64,
    /// Newest first when set
    #[serde(default)]
    pub desc: bool,
}

/// Write one value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetValueRequest {
    pub namespace_id: String,
    pub key: String,
    pub value: String,
    /// TTL in seconds; 0 selects the configured default
    #[serde(default)]
    pub expiration: u64,
}

impl SetValueRequest {
    pub fn new(
        namespace_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            key: key.into(),
            value: value.into(),
            expiration: 0,
        }
    }

    pub fn with_expiration(mut self, secs: u64) -> Self {
        self.expiration = secs;
        self
    }
}

/// One item of a bulk write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItem {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub expiration: u64,
}

impl BulkItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expiration: 0,
        }
    }
}

/// Write many values into one namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSetRequest {
    pub namespace_id: String,
    pub items: Vec<BulkItem>,
}

/// List the live keys of a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKeysRequest {
    pub namespace_id: String,
    /// 1-indexed page number
    pub page: u64,
    /// Page size
    pub size: u64,
}
