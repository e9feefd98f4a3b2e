//! Optional `pagelist.ron` overrides for paging and snapshot location.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pagelist_engine::PagingSettings;
use pagelist_logging::{pagelist_info, pagelist_warn};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "pagelist.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paging: PagingSettings,
    pub snapshot_dir: PathBuf,
    /// Mirror log output to the terminal as well as `pagelist.log`.
    pub log_to_terminal: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paging: PagingSettings::default(),
            snapshot_dir: PathBuf::from(".pagelist_state"),
            log_to_terminal: false,
        }
    }
}

/// Reads `pagelist.ron` from `dir`.
///
/// A missing file yields the defaults; an unreadable or malformed one is
/// logged and ignored.
pub fn load_config(dir: &Path) -> AppConfig {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return AppConfig::default(),
        Err(err) => {
            pagelist_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str::<AppConfig>(&content) {
        Ok(config) => {
            pagelist_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            pagelist_warn!("Ignoring malformed config {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}
