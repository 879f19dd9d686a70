//! Pagination envelope
//!
//! Pages are 1-indexed. Page 0 is read as page 1, a page past the end is
//! empty but still reports the correct `total` and `total_pages`.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{KvError, Result};

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    /// Index range of `page` within a listing of `total` items
    pub fn bounds(total: usize, page: u64, page_size: u64) -> Result<Range<usize>> {
        if page_size == 0 {
            return Err(KvError::InvalidArgument("page size must be positive".into()));
        }
        let page = page.max(1);
        let page_size = usize::try_from(page_size).unwrap_or(usize::MAX);
        let start = usize::try_from(page - 1)
            .unwrap_or(usize::MAX)
            .saturating_mul(page_size)
            .min(total);
        let end = start.saturating_add(page_size).min(total);
        Ok(start..end)
    }

    /// Envelope around an already-sliced page
    pub fn from_parts(items: Vec<T>, total: usize, page: u64, page_size: u64) -> Self {
        let total = total as u64;
        Self {
            items,
            total,
            page: page.max(1),
            page_size,
            total_pages: total_pages(total, page_size),
        }
    }

    /// Slice `page` out of a complete listing
    pub fn paginate(mut all: Vec<T>, page: u64, page_size: u64) -> Result<Self> {
        let total = all.len();
        let range = Self::bounds(total, page, page_size)?;
        let items = all.drain(range).collect();
        Ok(Self::from_parts(items, total, page, page_size))
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}
