use thiserror::Error;

/// A window into a remote collection: skip `offset` items, return at most `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Request for the zero-based page `index` of fixed-size pages.
    pub fn page(index: usize, size: usize) -> Self {
        Self {
            offset: index * size,
            limit: size,
        }
    }

    pub fn portion(offset: usize, count: usize) -> Self {
        Self {
            offset,
            limit: count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Remote collection size, when the source reports it.
    pub total_count: Option<usize>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            total_count: None,
        }
    }

    pub fn with_total(items: Vec<T>, total_count: usize) -> Self {
        Self {
            items,
            total_count: Some(total_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("remote error: {message}")]
    Remote { message: String },
    #[error("not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
}

impl FetchError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

/// Outcome of a fetch that was not cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent<T> {
    Loaded { request: PageRequest, page: Page<T> },
    Failed { request: PageRequest, error: FetchError },
}
