//! Record codec
//!
//! Encoding and decoding of persisted records.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KvError, Result};

/// Encode a record to its on-disk bytes
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(record)?)
}

/// Decode a record read from `path`
///
/// Bytes that are not a valid encoding of `T` fail with `MalformedRecord`
/// naming the file.
pub fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| KvError::MalformedRecord {
        path: path.to_path_buf(),
        source,
    })
}
