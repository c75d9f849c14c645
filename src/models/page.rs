//! Paginated list envelope used by the backend.

use serde::{Deserialize, Serialize};

/// Pagination metadata; `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Wrap a full, unpaginated list.
    pub fn single(data: Vec<T>) -> Self {
        let total = data.len();
        Self {
            data,
            meta: PageMeta {
                page: 1,
                per_page: total.max(1),
                total,
            },
        }
    }
}
