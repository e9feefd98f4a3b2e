#![deny(missing_docs)]
//! Logging front end for the pagelist crates.
//!
//! Every record goes through the `log` facade under the `pagelist` target,
//! so a host application can route or silence paging chatter on its own.
//! Installing a logger is left to the binary; tests call
//! [`initialize_for_tests`].

use std::str::FromStr;

use log::LevelFilter;

/// Target attached to every record emitted by the macros below.
pub const TARGET: &str = "pagelist";

/// Environment variable read by [`initialize_for_tests`], e.g. `PAGELIST_LOG=trace`.
pub const TEST_LEVEL_ENV: &str = "PAGELIST_LOG";

#[doc(hidden)]
#[macro_export]
macro_rules! __pagelist_log {
    ($level:expr, $($arg:tt)*) => {{
        log::log!(target: $crate::TARGET, $level, $($arg)*);
    }};
}

/// Per-fetch detail.
#[macro_export]
macro_rules! pagelist_trace {
    ($($arg:tt)*) => { $crate::__pagelist_log!(log::Level::Trace, $($arg)*) };
}

/// Request starts, cancellations, snapshot writes.
#[macro_export]
macro_rules! pagelist_debug {
    ($($arg:tt)*) => { $crate::__pagelist_log!(log::Level::Debug, $($arg)*) };
}

/// Screen-level milestones.
#[macro_export]
macro_rules! pagelist_info {
    ($($arg:tt)*) => { $crate::__pagelist_log!(log::Level::Info, $($arg)*) };
}

/// Recoverable failures: a fetch that failed, a snapshot that was unreadable.
#[macro_export]
macro_rules! pagelist_warn {
    ($($arg:tt)*) => { $crate::__pagelist_log!(log::Level::Warn, $($arg)*) };
}

/// Failures that lose user state.
#[macro_export]
macro_rules! pagelist_error {
    ($($arg:tt)*) => { $crate::__pagelist_log!(log::Level::Error, $($arg)*) };
}

/// Installs a terminal logger once per test binary; later calls are no-ops.
///
/// The level comes from `PAGELIST_LOG` when it parses, else debug in debug
/// builds and info otherwise.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let fallback = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let level = std::env::var(TEST_LEVEL_ENV)
        .ok()
        .and_then(|value| LevelFilter::from_str(&value).ok())
        .unwrap_or(fallback);

    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .build();
    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
