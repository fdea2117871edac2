//! Periodic WhatsApp-to-leads synchronisation.
//!
//! [`SyncWorker`] reconciles a [`leadbook_core::source::ConversationSource`]
//! into a [`leadbook_core::store::LeadStore`]: every pass fetches the full
//! conversation list and upserts one lead per phone number. A phone number
//! already in the store has its title and status refreshed in place; an
//! unknown one becomes a new lead carrying the conversation's original
//! `created_at`.
//!
//! The worker runs in two ways:
//!
//! - a repeating timer ([`SyncWorker::start`]) that fires a pass immediately
//!   and then once per interval, and
//! - one-shot passes ([`SyncWorker::run_once`]) for manual triggers.
//!
//! Both share a single in-flight guard, so passes never overlap: a timer
//! tick that lands mid-pass is skipped with a warning, a manual trigger gets
//! [`Error::Busy`].

mod worker;

pub mod error;

pub use error::{Error, Result};
pub use worker::{DEFAULT_INTERVAL_MINUTES, SyncSummary, SyncWorker, WorkerStatus};

#[cfg(test)]
mod tests;
