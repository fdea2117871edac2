//! MySQL backend for the WhatsApp conversation source.
//!
//! The conversation database belongs to the WhatsApp bot, not to Leadbook;
//! this crate only ever reads from it. Every call opens a fresh connection
//! and closes it before returning, so no connection state outlives a sync
//! pass.

mod source;

pub mod error;

pub use error::{Error, Result};
pub use source::{MySqlSource, MySqlSourceConfig};
