//! Pagelist core: pure paginated-list state machines and the screen adapter.
mod adapter;
mod list;
mod message_window;

pub use adapter::{ListUpdater, Next, Reducer};
pub use list::{ListAction, ListSideEffect, ListState};
pub use message_window::{
    MessageWindowAction, MessageWindowSideEffect, MessageWindowState, DEFAULT_PORTION_SIZE,
};
