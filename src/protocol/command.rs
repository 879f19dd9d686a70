//! Command definitions
//!
//! One variant per engine operation.

use serde::{Deserialize, Serialize};

use super::{
    BulkSetRequest, CreateNamespaceRequest, ListKeysRequest, ListNamespacesRequest,
    SetValueRequest,
};

/// A request routed through `Engine::execute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    CreateNamespace(CreateNamespaceRequest),

    #[serde(rename_all = "camelCase")]
    GetNamespace { namespace_id: String },

    ListNamespaces(ListNamespacesRequest),

    #[serde(rename_all = "camelCase")]
    RenameNamespace { namespace_id: String, name: String },

    #[serde(rename_all = "camelCase")]
    DeleteNamespace { namespace_id: String },

    SetValue(SetValueRequest),

    BulkSetValue(BulkSetRequest),

    #[serde(rename_all = "camelCase")]
    GetValue { namespace_id: String, key: String },

    #[serde(rename_all = "camelCase")]
    DeleteValue { namespace_id: String, key: String },

    #[serde(rename_all = "camelCase")]
    BulkDeleteValue {
        namespace_id: String,
        keys: Vec<String>,
    },

    ListKeys(ListKeysRequest),
}

impl Command {
    /// Operation name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateNamespace(_) => "create_namespace",
            Command::GetNamespace { .. } => "get_namespace",
            Command::ListNamespaces(_) => "list_namespaces",
            Command::RenameNamespace { .. } => "rename_namespace",
            Command::DeleteNamespace { .. } => "delete_namespace",
            Command::SetValue(_) => "set_value",
            Command::BulkSetValue(_) => "bulk_set_value",
            Command::GetValue { .. } => "get_value",
            Command::DeleteValue { .. } => "delete_value",
            Command::BulkDeleteValue { .. } => "bulk_delete_value",
            Command::ListKeys(_) => "list_keys",
        }
    }
}
