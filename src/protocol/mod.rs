//! Protocol Module
//!
//! Value objects crossing the engine boundary. Collaborators (HTTP glue,
//! SDK shims, tests) build a request, hand it to the engine and get a
//! response back; nothing about transport leaks in.
//!
//! ## Shapes
//! - Requests: already-validated scalar fields (ids, keys, TTL, paging)
//! - Responses: plain values, booleans, or a `Page` envelope
//!   `{items, total, page, pageSize, totalPages}`
//! - `Command` / `Response`: one enum variant per engine operation, routed
//!   by `Engine::execute`

mod command;
mod page;
mod request;
mod response;

pub use command::Command;
pub use page::Page;
pub use request::{
    BulkItem, BulkSetRequest, CreateNamespaceRequest, ListKeysRequest, ListNamespacesRequest,
    SetValueRequest,
};
pub use response::{KeyInfo, NamespaceInfo, Response, ValueLookup};
