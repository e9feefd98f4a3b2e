use pagelist_engine::SnapshotStore;
use pagelist_logging::{pagelist_error, pagelist_info, pagelist_warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::repository::ChatId;

pub(crate) const PATIENTS_KEY: &str = "patients";

pub(crate) fn chat_key(chat_id: ChatId) -> String {
    format!("chat-{chat_id}")
}

/// Restores a screen snapshot, treating any failure as "nothing saved".
pub(crate) fn restore<S: DeserializeOwned>(store: &SnapshotStore, key: &str) -> Option<S> {
    match store.load(key) {
        Ok(Some(state)) => {
            pagelist_info!("Restored snapshot {} from {:?}", key, store.dir());
            Some(state)
        }
        Ok(None) => None,
        Err(err) => {
            pagelist_warn!("Discarding unreadable snapshot {}: {}", key, err);
            None
        }
    }
}

pub(crate) fn persist<S: Serialize>(store: &SnapshotStore, key: &str, state: &S) {
    if let Err(err) = store.save(key, state) {
        pagelist_error!("Failed to save snapshot {} to {:?}: {}", key, store.dir(), err);
    }
}
