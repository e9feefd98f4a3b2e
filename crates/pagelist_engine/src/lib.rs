//! Pagelist engine: page fetching, cancellation and snapshot persistence.
mod fetch;
mod loader;
mod persist;
mod settings;
mod types;

pub use fetch::PageFetcher;
pub use loader::PageLoader;
pub use persist::{ensure_dir, PersistError, SnapshotStore};
pub use settings::PagingSettings;
pub use types::{FetchError, LoadEvent, Page, PageRequest};
