use std::time::Duration;

use pagelist_core::DEFAULT_PORTION_SIZE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingSettings {
    /// Items per page for page-indexed lists.
    pub page_size: usize,
    /// Items per fetch for message windows.
    pub portion_size: usize,
    /// `None` leaves timeouts to the fetcher.
    pub request_timeout_secs: Option<u64>,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            page_size: 20,
            portion_size: DEFAULT_PORTION_SIZE,
            request_timeout_secs: Some(30),
        }
    }
}

impl PagingSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
