//! # nskv
//!
//! A local, file-system-backed namespaced key-value store that stands in
//! for a remote storage service during offline development and testing:
//! - Namespaces with generated ids and unique names
//! - Per-key expiration, enforced at read time
//! - Paged listings of namespaces and keys
//! - Usage stats computed by scanning the stored records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Requests / Command                          │
//! │            (built by transport or SDK glue)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │       (namespace CRUD, key get/set/delete, listing)          │
//! └──────────┬──────────────────┬──────────────────┬────────────┘
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//!   ┌─────────────────┐ ┌──────────────┐  ┌────────────────┐
//!   │    Namespace    │ │    Stats     │  │    Sweeper     │
//!   │    Directory    │ │  Aggregator  │  │  (on demand /  │
//!   └────────┬────────┘ └──────┬───────┘  │   background)  │
//!            │                 │          └───────┬────────┘
//!            ▼                 ▼                  ▼
//!   ┌─────────────────────────────────────────────────────────┐
//!   │       Path Layout + Record Codec  →  {data_dir}/...     │
//!   └─────────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, ScanPolicy};
pub use engine::Engine;
pub use protocol::{Command, Page, Response, ValueLookup};
pub use storage::{Stats, SweepReport, SweeperHandle};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of nskv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
