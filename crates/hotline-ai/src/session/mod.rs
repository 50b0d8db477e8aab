//! Conversation session management.
//!
//! A `Session` owns the growing transcript of one call, submits inbound
//! turns to a streaming provider, and emits phrase-delimited reply
//! segments. At most one turn is in flight at a time; extra turns are
//! dropped, not queued.

mod manager;
mod turn;
mod types;

pub use manager::Session;
