//! Screen models built on the pagelist state machines.

pub mod chat;
pub mod patient_list;
