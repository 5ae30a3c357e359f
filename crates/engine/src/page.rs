use serde::Serialize;

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

/// 1-based page selector for admin listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub(crate) fn validated(self) -> ResultEngine<Self> {
        if self.page == 0 {
            return Err(EngineError::InvalidArgument("page must be >= 1".to_string()));
        }
        if self.limit == 0 || self.limit > MAX_PAGE_LIMIT {
            return Err(EngineError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_PAGE_LIMIT}"
            )));
        }
        Ok(self)
    }

    /// Zero-based index as used by the sea-orm paginator.
    pub(crate) fn index(&self) -> u64 {
        self.page - 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}
