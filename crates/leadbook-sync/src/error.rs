//! Worker error type.

use thiserror::Error;

/// An error from starting or running an import pass.
#[derive(Debug, Error)]
pub enum Error {
  /// Another pass is still in flight; nothing was started.
  #[error("an import pass is already running")]
  Busy,

  /// The timer needs an interval of at least one minute.
  #[error("interval must be at least one minute")]
  InvalidInterval,

  /// The conversation source could not be read, so the pass made no changes.
  #[error("conversation source error: {0}")]
  Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
